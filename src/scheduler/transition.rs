use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::time::Duration;

use crate::hal::HardwareWriteError;
use crate::model::{Color, Crosswalk, Event, InternalEvent, TrafficSemaphore, YELLOW_DURATION};
use crate::verbose::{EVENT_HARDWARE_WRITE_RETRY, EVENT_PHASE_TRANSITION, EVENT_YELLOW_INTERLOCK};

use super::timer::PhaseTimer;

/// An immutable snapshot of one phase-to-phase transition, computed by the
/// mediator consumer thread (which alone reads `current_phase_idx` and the
/// phase table) and handed to the scheduler worker (spec §5 "the job
/// carries an immutable snapshot of what to do").
#[derive(Debug, Clone)]
pub struct TransitionJob {
    pub next_idx: usize,
    pub green_time: Duration,
    pub off_tsem: Vec<i32>,
    pub off_crosswalk: Vec<(i32, i32)>,
    pub on_tsem: Vec<i32>,
    pub on_crosswalk: Vec<(i32, i32)>,
}

/// Read-only by-location lookup over the element tables, built once at
/// scheduler construction (spec §5 "phase table is read-only after SET_UP").
pub struct ElementLookup {
    tsems: HashMap<i32, Arc<TrafficSemaphore>>,
    crosswalks: HashMap<(i32, i32), Arc<Crosswalk>>,
}

impl ElementLookup {
    pub fn new(tsems: Vec<Arc<TrafficSemaphore>>, crosswalks: Vec<Arc<Crosswalk>>) -> Self {
        Self {
            tsems: tsems.into_iter().map(|t| (t.location(), t)).collect(),
            crosswalks: crosswalks.into_iter().map(|c| (c.span(), c)).collect(),
        }
    }

    fn tsem(&self, location: i32) -> &TrafficSemaphore {
        self.tsems.get(&location).expect("transition job referenced an unknown TSEM location")
    }

    fn crosswalk(&self, span: (i32, i32)) -> &Crosswalk {
        self.crosswalks.get(&span).expect("transition job referenced an unknown crosswalk span")
    }
}

/// Retries a hardware write once; a second failure is escalated to the
/// mediator as [`InternalEvent::HardwareFault`] instead of panicking or
/// propagating out of the worker (spec §7 HardwareWriteError).
fn write_with_retry<F>(event_tx: &Sender<Event>, mut op: F)
where
    F: FnMut() -> Result<(), HardwareWriteError>,
{
    if let Err(first) = op() {
        crate::log_main!(EVENT_HARDWARE_WRITE_RETRY, "retrying failed hardware write", line = first.line);
        if let Err(second) = op() {
            let _ = event_tx.send(Event::Internal(InternalEvent::HardwareFault { line: second.line }));
        }
    }
}

/// Executes the eight/nine-step transition algorithm (spec §4.C) for one
/// [`TransitionJob`], enforcing the strict ordering
/// `OFF_CROSS→RED ≺ OFF_TSEM→YELLOW ≺ OFF_TSEM→RED ≺ ON→GREEN` by
/// construction (sequential statements, no interleaving).
pub fn run_transition(
    job: &TransitionJob,
    lookup: &ElementLookup,
    yellow_timer: &PhaseTimer,
    phase_timer: &PhaseTimer,
    event_tx: &Sender<Event>,
    emergency_active: &AtomicBool,
    current_phase_idx: &AtomicUsize,
) {
    crate::log_main!(
        EVENT_PHASE_TRANSITION,
        "beginning phase transition",
        next_idx = job.next_idx
    );

    // Steps 1-3: OFF_CROSS -> RED, immediately.
    for &span in &job.off_crosswalk {
        let crosswalk = lookup.crosswalk(span);
        write_with_retry(event_tx, || crosswalk.switch_to(Color::Red));
        crosswalk.update_buzzers(emergency_active.load(Ordering::SeqCst));
    }

    // Step 4: OFF_TSEM -> YELLOW.
    for &location in &job.off_tsem {
        let tsem = lookup.tsem(location);
        write_with_retry(event_tx, || tsem.switch_to(Color::Yellow));
    }

    // Step 5: fixed yellow interlock, never shortened by early-fire.
    crate::log_detailed!(EVENT_YELLOW_INTERLOCK, "holding yellow interlock", seconds = YELLOW_DURATION);
    yellow_timer.wait(Duration::from_secs(YELLOW_DURATION as u64));
    let _ = event_tx.send(Event::Internal(InternalEvent::YellowTimeout));

    // Step 6: OFF_TSEM -> RED.
    for &location in &job.off_tsem {
        let tsem = lookup.tsem(location);
        write_with_retry(event_tx, || tsem.switch_to(Color::Red));
    }

    // Step 7: ON -> GREEN (pedestrian signals, then traffic signals).
    for &span in &job.on_crosswalk {
        let crosswalk = lookup.crosswalk(span);
        write_with_retry(event_tx, || crosswalk.switch_to(Color::Green));
        crosswalk.update_buzzers(emergency_active.load(Ordering::SeqCst));
    }
    for &location in &job.on_tsem {
        let tsem = lookup.tsem(location);
        write_with_retry(event_tx, || tsem.switch_to(Color::Green));
    }

    // The new phase is live the instant its lights are green: publish the
    // index now rather than after the dwell, so a mediator thread reacting
    // to LIGHTS_TIMEOUT below always observes the phase that just finished,
    // never the one before it.
    current_phase_idx.store(job.next_idx, Ordering::SeqCst);

    // Step 8: phase timer, early-firable for emergency pre-emption.
    phase_timer.wait(job.green_time);

    // Step 9: publish LIGHTS_TIMEOUT; the mediator advances current_phase_idx.
    let _ = event_tx.send(Event::Internal(InternalEvent::LightsTimeout));
}
