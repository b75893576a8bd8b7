//! `ControllerContext` is the mutable state every [`super::Strategy`] acts
//! on: the element tables, the phase table, the scheduler, the emergency
//! FIFO, and the outbound cloud channel. It lives entirely on the mediator
//! consumer thread (spec §5 "`current_phase_idx`, `EmergencyContext` FIFO,
//! and per-Phase `time` are mutated only by the mediator consumer thread"),
//! so none of its fields need locking.
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use uuid::Uuid;

use crate::cloud::CloudRequest;
use crate::config::HardwareFactory;
use crate::error::ControlError;
use crate::model::{Color, Crosswalk, EmergencyContext, Event, Phase, TrafficSemaphore};
use crate::scheduler::{Scheduler, TransitionJob};
use crate::verbose::{EVENT_PEDESTRIAN_EXTEND, EVENT_RFID_VALIDATED};
use crate::{log_additional, log_main};

/// Everything a strategy needs to turn one [`Event`] into scheduler/cloud
/// side effects. Constructed once by `control.rs` before SET_UP begins;
/// `tsems`/`crosswalks`/`phases`/`scheduler` start empty and are populated
/// by [`super::set_up::SetUpStrategy`] once the configuration documents
/// arrive.
pub struct ControllerContext {
    pub(crate) tsems: Vec<Arc<TrafficSemaphore>>,
    pub(crate) crosswalks: Vec<Arc<Crosswalk>>,
    pub(crate) phases: Vec<Phase>,
    pub(crate) max_location: i32,
    pub(crate) scheduler: Option<Scheduler>,
    pub(crate) cloud_tx: Sender<CloudRequest>,
    pub(crate) event_tx: Sender<Event>,
    pub(crate) emergency_queue: VecDeque<EmergencyContext>,
    pub(crate) emergency_active: Arc<AtomicBool>,
    pub(crate) hw: Option<Box<dyn HardwareFactory>>,
    pub(crate) watcher_shutdown: Arc<AtomicBool>,
    pub(crate) watcher_handles: Vec<JoinHandle<()>>,
    /// Set by a strategy that decides the controller cannot continue (a
    /// fatal SET_UP `ConfigError`, or a persistent cloud/hardware
    /// escalation into FAILURE); `control.rs` reads it after shutdown to
    /// pick the process exit code (spec §6.5). Library code never calls
    /// `std::process::exit` itself (SPEC_FULL.md §8).
    pub fatal_error: Option<ControlError>,
    /// Mirrors "a FAILURE strategy is now installed" to a flag the binary
    /// can poll from outside the mediator thread, so `controlbox` notices
    /// an autonomous escalation into FAILURE without waiting on a signal
    /// (spec §6.5).
    pub(crate) failed: Arc<AtomicBool>,
}

impl ControllerContext {
    pub fn new(
        cloud_tx: Sender<CloudRequest>,
        event_tx: Sender<Event>,
        hw: Box<dyn HardwareFactory>,
        failed: Arc<AtomicBool>,
    ) -> Self {
        Self {
            tsems: Vec::new(),
            crosswalks: Vec::new(),
            phases: Vec::new(),
            max_location: 0,
            scheduler: None,
            cloud_tx,
            event_tx,
            emergency_queue: VecDeque::new(),
            emergency_active: Arc::new(AtomicBool::new(false)),
            hw: Some(hw),
            watcher_shutdown: Arc::new(AtomicBool::new(false)),
            watcher_handles: Vec::new(),
            fatal_error: None,
            failed,
        }
    }

    pub(crate) fn mark_failed(&self) {
        self.failed.store(true, Ordering::SeqCst);
    }

    pub fn current_phase_idx(&self) -> usize {
        self.scheduler.as_ref().map(|s| s.current_phase_idx()).unwrap_or(0)
    }

    pub fn phase_count(&self) -> usize {
        self.phases.len()
    }

    fn crosswalk_at(&self, span: (i32, i32)) -> Option<&Arc<Crosswalk>> {
        self.crosswalks.iter().find(|c| c.span() == span)
    }

    /// Builds the [`TransitionJob`] for `current -> next` (spec §4.C steps
    /// 1-7's OFF/ON sets) and hands it to the scheduler. A no-op before the
    /// scheduler exists (pre-SET_UP) or if `phases` is empty (spec §8
    /// "maxLocation = 0 -> no phases emitted").
    pub(crate) fn submit_transition(&self, next_idx: usize, green_time_override: Option<Duration>) {
        let (Some(scheduler), false) = (&self.scheduler, self.phases.is_empty()) else { return };
        let current = &self.phases[self.current_phase_idx()];
        let next = &self.phases[next_idx];
        let green_time = green_time_override.unwrap_or_else(|| Duration::from_secs(next.time() as u64));

        let off_tsem: Vec<i32> =
            current.tsem_locations().iter().copied().filter(|loc| !next.contains_tsem(*loc)).collect();
        let off_crosswalk: Vec<(i32, i32)> = current
            .crosswalk_spans()
            .iter()
            .copied()
            .filter(|span| !next.contains_crosswalk(*span))
            .collect();

        scheduler.enqueue_transition(TransitionJob {
            next_idx,
            green_time,
            off_tsem,
            off_crosswalk,
            on_tsem: next.tsem_locations().to_vec(),
            on_crosswalk: next.crosswalk_spans().to_vec(),
        });
    }

    /// `LIGHTS_TIMEOUT` handling shared by NORMAL cycling and EMERGENCY
    /// return-to-normal (spec §4.E NORMAL, §12.1 Open Question resolution:
    /// per-phase button counters reset on transition completion, i.e. for
    /// the phase that just finished its green dwell).
    pub(crate) fn advance_to_next_phase(&mut self) {
        if self.phases.is_empty() {
            return;
        }
        let completed_idx = self.current_phase_idx();
        for span in self.phases[completed_idx].crosswalk_spans().to_vec() {
            if let Some(crosswalk) = self.crosswalk_at(span) {
                crosswalk.reset_button_counters();
            }
        }
        self.phases[completed_idx].reset_time();
        let next_idx = (completed_idx + 1) % self.phases.len();
        self.submit_transition(next_idx, None);
    }

    /// Pedestrian-button green extension (spec §4.C, §4.E NORMAL): shortens
    /// the live phase timer by `REDUCE_SECONDS`, floor `MIN_SECONDS`, at
    /// most once per phase per crosswalk. Also records the crossing with
    /// the cloud collaborator (spec §6.1 `p_semaphore_pedestrian`).
    pub(crate) fn try_extend_for_pedestrian(&mut self, location: i32) {
        let current_idx = self.current_phase_idx();
        let Some(span) = self.phases[current_idx]
            .crosswalk_spans()
            .iter()
            .copied()
            .find(|&(a, b)| a == location || b == location)
        else {
            return;
        };
        let Some(crosswalk) = self.crosswalk_at(span) else { return };
        if crosswalk.already_extended() {
            return;
        }
        let Some(scheduler) = &self.scheduler else { return };
        let Some(remaining) = scheduler.remaining_green() else { return };

        if let Some(new_remaining) = self.phases[current_idx].extend_for_pedestrian(remaining.as_secs() as u32) {
            scheduler.shrink_to(Duration::from_secs(new_remaining as u64));
            log_additional!(
                EVENT_PEDESTRIAN_EXTEND,
                "granted pedestrian green extension",
                location = location,
                new_remaining = new_remaining
            );
            let _ = self.cloud_tx.send(CloudRequest::PedestrianCrossing {
                psem_id: location.to_string(),
                pedestrian_cc_id: Uuid::new_v4().to_string(),
            });
        }
    }

    /// RFID-recognized green shortening for a future activation (spec
    /// §4.C, §4.E NORMAL, §12.2 asymmetric-cap Open Question): finds the
    /// next upcoming phase (after the current one, in cyclic order) whose
    /// crosswalks include `location` and applies [`Phase::extend_for_rfid`].
    pub(crate) fn try_extend_for_rfid(&mut self, location: i32) {
        if self.phases.is_empty() {
            return;
        }
        let n = self.phases.len();
        let start = (self.current_phase_idx() + 1) % n;
        for offset in 0..n {
            let idx = (start + offset) % n;
            let serves_location =
                self.phases[idx].crosswalk_spans().iter().any(|&(a, b)| a == location || b == location);
            if serves_location {
                if self.phases[idx].extend_for_rfid() {
                    log_additional!(EVENT_RFID_VALIDATED, "extended upcoming phase for validated RFID", idx = idx);
                }
                return;
            }
        }
    }

    /// Immediate, un-timed all-red assertion: FAILURE's entry action (spec
    /// §4.E FAILURE) and the final step of graceful shutdown (spec §5
    /// Cancellation step 3). Bypasses the scheduler and the yellow
    /// interlock entirely since this is a safety stop, not a scheduled
    /// transition.
    pub(crate) fn drive_all_red(&self) {
        for tsem in &self.tsems {
            let _ = tsem.switch_to(Color::Red);
        }
        for crosswalk in &self.crosswalks {
            let _ = crosswalk.switch_to(Color::Red);
        }
    }

    /// Spawns one watcher thread per button and per RFID reader, matching
    /// spec §4.A SET_UP's "starts dependent threads (button watchers, RFID
    /// readers)". Each watcher polls at a fixed short interval and pushes
    /// `PedestrianButtonEvent`/`PedestrianRfidEvent` onto the mediator
    /// queue; debouncing already happened inside `poll_button` (spec §5,
    /// §9: 200ms steady-clock window).
    pub(crate) fn start_watchers(&mut self) {
        const POLL_INTERVAL: Duration = Duration::from_millis(20);

        for crosswalk in self.crosswalks.clone() {
            for side in [Side::First, Side::Second] {
                let location = side.location(&crosswalk);
                if !side.has_button(&crosswalk) {
                    continue;
                }
                let watched = Arc::clone(&crosswalk);
                let tx = self.event_tx.clone();
                let shutdown = Arc::clone(&self.watcher_shutdown);
                let handle = thread::Builder::new()
                    .name(format!("button-watcher-{}", location))
                    .spawn(move || {
                        while !shutdown.load(Ordering::Relaxed) {
                            if side.poll_button(&watched) {
                                let _ = tx.send(Event::PedestrianButton { location });
                            }
                            thread::sleep(POLL_INTERVAL);
                        }
                    })
                    .expect("failed to spawn button watcher thread");
                self.watcher_handles.push(handle);
            }
        }

        for crosswalk in self.crosswalks.clone() {
            for side in [Side::First, Side::Second] {
                let location = side.location(&crosswalk);
                let watched = Arc::clone(&crosswalk);
                let tx = self.event_tx.clone();
                let shutdown = Arc::clone(&self.watcher_shutdown);
                let handle = thread::Builder::new()
                    .name(format!("rfid-watcher-{}", location))
                    .spawn(move || {
                        while !shutdown.load(Ordering::Relaxed) {
                            if let Some(uuid) = side.poll_rfid(&watched) {
                                let _ = tx.send(Event::PedestrianRfid { location, uuid });
                            }
                            thread::sleep(POLL_INTERVAL);
                        }
                    })
                    .expect("failed to spawn RFID watcher thread");
                self.watcher_handles.push(handle);
            }
        }
    }

    /// Stops and joins every watcher thread. Called once by `control.rs`
    /// after the mediator thread hands the context back.
    pub fn join_watchers(&mut self) {
        self.watcher_shutdown.store(true, Ordering::SeqCst);
        for handle in self.watcher_handles.drain(..) {
            let _ = handle.join();
        }
    }

    pub fn take_scheduler(&mut self) -> Option<Scheduler> {
        self.scheduler.take()
    }

    pub fn log_setup_complete(&self) {
        log_main!(
            crate::verbose::EVENT_SETUP_COMPLETE,
            "configuration loaded, phases enumerated",
            phases = self.phases.len()
        );
    }
}

/// Picks one of a crosswalk's two ordered pedestrian semaphores, so a
/// watcher thread can be spawned identically for both without duplicating
/// the poll logic.
#[derive(Clone, Copy)]
enum Side {
    First,
    Second,
}

impl Side {
    fn location(self, crosswalk: &Crosswalk) -> i32 {
        match self {
            Side::First => crosswalk.psem1().location(),
            Side::Second => crosswalk.psem2().location(),
        }
    }

    fn has_button(self, crosswalk: &Crosswalk) -> bool {
        match self {
            Side::First => crosswalk.psem1().has_button(),
            Side::Second => crosswalk.psem2().has_button(),
        }
    }

    fn poll_button(self, crosswalk: &Crosswalk) -> bool {
        match self {
            Side::First => crosswalk.psem1().poll_button(),
            Side::Second => crosswalk.psem2().poll_button(),
        }
    }

    fn poll_rfid(self, crosswalk: &Crosswalk) -> Option<u32> {
        match self {
            Side::First => crosswalk.psem1().poll_rfid(),
            Side::Second => crosswalk.psem2().poll_rfid(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    use crate::cloud::CloudRequest;
    use crate::config::SimHardwareFactory;
    use crate::hal::sim::{SimButton, SimLightLine};
    use crate::model::{PedestrianSemaphore, DEFAULT_SWITCHING_TIME};

    fn tsem(location: i32, destinations: Vec<i32>) -> Arc<TrafficSemaphore> {
        Arc::new(TrafficSemaphore::new(
            location,
            destinations,
            Box::new(SimLightLine::new((location * 10) as u32)),
            Box::new(SimLightLine::new((location * 10 + 1) as u32)),
            Box::new(SimLightLine::new((location * 10 + 2) as u32)),
        ))
    }

    /// A crosswalk whose first semaphore has already registered one
    /// debounced press, as if a watcher thread had just observed it.
    fn crosswalk_already_pressed_once(a: i32, b: i32) -> Arc<Crosswalk> {
        let mut button = SimButton::new();
        button.press_at(std::time::Instant::now());
        let psem_a = PedestrianSemaphore::new(
            a,
            Box::new(SimLightLine::new((a * 10) as u32)),
            Box::new(SimLightLine::new((a * 10 + 1) as u32)),
            Some(Box::new(button)),
            None,
            None,
        );
        assert!(psem_a.poll_button());
        let psem_b = PedestrianSemaphore::new(
            b,
            Box::new(SimLightLine::new((b * 10) as u32)),
            Box::new(SimLightLine::new((b * 10 + 1) as u32)),
            None,
            None,
            None,
        );
        Arc::new(Crosswalk::new(psem_a, psem_b))
    }

    fn context_without_scheduler() -> ControllerContext {
        let (cloud_tx, _cloud_rx) = mpsc::channel::<CloudRequest>();
        let (event_tx, _event_rx) = mpsc::channel::<Event>();
        ControllerContext::new(cloud_tx, event_tx, Box::new(SimHardwareFactory::new()), Arc::new(AtomicBool::new(false)))
    }

    #[test]
    fn advance_to_next_phase_resets_completed_phase_state() {
        let mut ctx = context_without_scheduler();
        let t0 = tsem(0, vec![4]);
        let t1 = tsem(1, vec![5]);
        ctx.tsems = vec![Arc::clone(&t0), Arc::clone(&t1)];
        ctx.phases = vec![Phase::new(vec![0], vec![]), Phase::new(vec![1], vec![])];

        let (event_tx, _event_rx) = mpsc::channel::<Event>();
        ctx.scheduler = Some(Scheduler::new(
            ctx.tsems.clone(),
            ctx.crosswalks.clone(),
            event_tx,
            Arc::clone(&ctx.emergency_active),
        ));

        ctx.phases[0].extend_for_rfid();
        assert_eq!(ctx.phases[0].time(), DEFAULT_SWITCHING_TIME * 2);

        ctx.advance_to_next_phase();

        assert_eq!(ctx.phases[0].time(), DEFAULT_SWITCHING_TIME);
        // Not joined: the worker is mid-transition (yellow interlock, then a
        // fresh green dwell) and `shutdown` would block for both. Dropping
        // `ctx` detaches the worker thread, which is harmless for a test.
    }

    #[test]
    fn try_extend_for_rfid_extends_the_next_upcoming_phase_cyclically() {
        let mut ctx = context_without_scheduler();
        ctx.phases = vec![
            Phase::new(vec![0], vec![]),
            Phase::new(vec![1], vec![(2, 6)]),
            Phase::new(vec![2], vec![]),
        ];
        // current_phase_idx() is 0 with no scheduler; the search starts at
        // index 1, which is the first phase serving crosswalk location 2.
        ctx.try_extend_for_rfid(2);
        assert_eq!(ctx.phases[1].time(), DEFAULT_SWITCHING_TIME * 2);
        assert_eq!(ctx.phases[0].time(), DEFAULT_SWITCHING_TIME);
        assert_eq!(ctx.phases[2].time(), DEFAULT_SWITCHING_TIME);
    }

    #[test]
    fn try_extend_for_rfid_is_a_noop_when_no_phase_serves_the_location() {
        let mut ctx = context_without_scheduler();
        ctx.phases = vec![Phase::new(vec![0], vec![])];
        ctx.try_extend_for_rfid(99);
        assert_eq!(ctx.phases[0].time(), DEFAULT_SWITCHING_TIME);
    }

    #[test]
    fn drive_all_red_switches_every_element() {
        let mut ctx = context_without_scheduler();
        let t0 = tsem(0, vec![4]);
        t0.switch_to(Color::Green).unwrap();
        ctx.tsems = vec![Arc::clone(&t0)];
        ctx.drive_all_red();
        assert_eq!(t0.color(), Color::Red);
    }

    #[test]
    fn mark_failed_sets_the_shared_flag() {
        let ctx = context_without_scheduler();
        assert!(!ctx.failed.load(Ordering::SeqCst));
        ctx.mark_failed();
        assert!(ctx.failed.load(Ordering::SeqCst));
    }

    #[test]
    fn pedestrian_extension_shrinks_the_live_dwell_once_per_phase() {
        let mut ctx = context_without_scheduler();
        let t0 = tsem(0, vec![4]);
        let crosswalk = crosswalk_already_pressed_once(1, 3);
        ctx.tsems = vec![Arc::clone(&t0)];
        ctx.crosswalks = vec![Arc::clone(&crosswalk)];
        ctx.phases = vec![Phase::new(vec![0], vec![(1, 3)])];

        let (event_tx, _event_rx) = mpsc::channel::<Event>();
        ctx.scheduler = Some(Scheduler::new(
            ctx.tsems.clone(),
            ctx.crosswalks.clone(),
            event_tx,
            Arc::clone(&ctx.emergency_active),
        ));
        ctx.submit_transition(0, Some(Duration::from_secs(30)));

        let mut remaining_before = None;
        for _ in 0..300 {
            remaining_before = ctx.scheduler.as_ref().unwrap().remaining_green();
            if remaining_before.is_some() {
                break;
            }
            thread::sleep(Duration::from_millis(10));
        }
        let remaining_before = remaining_before.expect("green dwell never started");

        ctx.try_extend_for_pedestrian(1);
        let remaining_after = ctx.scheduler.as_ref().unwrap().remaining_green().unwrap();
        assert!(remaining_after < remaining_before, "extension did not shrink the live dwell");

        // A second debounced press in the same phase is not honored again.
        assert!(crosswalk.psem1().poll_button());
        assert!(crosswalk.already_extended());
        ctx.try_extend_for_pedestrian(1);

        if let Some(scheduler) = ctx.scheduler.take() {
            scheduler.early_fire();
            scheduler.shutdown();
        }
    }
}
