//! # Phase Scheduler
//!
//! Owns `current_phase_idx` and drives every light transition through the
//! eight/nine-step algorithm in [`transition::run_transition`] (spec §4.C).
//! The scheduler worker is a dedicated thread reading [`TransitionJob`]s off
//! an `std::sync::mpsc` channel; [`Scheduler::enqueue_transition`] is the
//! single submission primitive exposed to the strategy layer, matching the
//! concurrency model mandated by spec §5 (OS threads, blocking suspension
//! points, no busy-waiting).
pub mod timer;
pub mod transition;

pub use timer::PhaseTimer;
pub use transition::{run_transition, ElementLookup, TransitionJob};

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::model::{Crosswalk, Event, TrafficSemaphore};

/// The scheduler half owned by the controller: holds the submission
/// channel, the shared early-firable phase timer, and `current_phase_idx`.
/// The element tables and the yellow timer live entirely inside the worker
/// thread, since nothing outside it ever touches them (spec §5 "each
/// physical GPIO line has a single owner").
pub struct Scheduler {
    job_tx: Sender<TransitionJob>,
    phase_timer: Arc<PhaseTimer>,
    current_phase_idx: Arc<AtomicUsize>,
    worker: Option<JoinHandle<()>>,
}

impl Scheduler {
    pub fn new(
        tsems: Vec<Arc<TrafficSemaphore>>,
        crosswalks: Vec<Arc<Crosswalk>>,
        event_tx: Sender<Event>,
        emergency_active: Arc<AtomicBool>,
    ) -> Self {
        let (job_tx, job_rx) = mpsc::channel::<TransitionJob>();
        let phase_timer = Arc::new(PhaseTimer::new());
        let worker_phase_timer = Arc::clone(&phase_timer);
        let current_phase_idx = Arc::new(AtomicUsize::new(0));
        let worker_idx = Arc::clone(&current_phase_idx);
        let lookup = ElementLookup::new(tsems, crosswalks);

        let worker = thread::Builder::new()
            .name("scheduler-worker".to_string())
            .spawn(move || {
                let yellow_timer = PhaseTimer::new();
                for job in job_rx.iter() {
                    run_transition(
                        &job,
                        &lookup,
                        &yellow_timer,
                        &worker_phase_timer,
                        &event_tx,
                        &emergency_active,
                        &worker_idx,
                    );
                }
            })
            .expect("failed to spawn scheduler worker thread");

        Self { job_tx, phase_timer, current_phase_idx, worker: Some(worker) }
    }

    /// Submits a transition to the worker (spec §4.C "single submission
    /// primitive"). Silently dropped if the worker has already shut down.
    pub fn enqueue_transition(&self, job: TransitionJob) {
        let _ = self.job_tx.send(job);
    }

    /// Arms the in-flight phase timer to fire immediately, collapsing the
    /// green dwell without truncating an in-progress yellow interlock (spec
    /// §4.C early-fire, §5 ordering guarantees).
    pub fn early_fire(&self) {
        self.phase_timer.early_fire();
    }

    /// Pulls the in-flight green dwell in to `remaining`, used by the
    /// NORMAL strategy's pedestrian-button extension (spec §4.C).
    pub fn shrink_to(&self, remaining: std::time::Duration) {
        self.phase_timer.shrink_to(remaining);
    }

    pub fn current_phase_idx(&self) -> usize {
        self.current_phase_idx.load(Ordering::SeqCst)
    }

    /// Time left on the in-flight green dwell, if any (spec §4.C pedestrian-
    /// button extension).
    pub fn remaining_green(&self) -> Option<std::time::Duration> {
        self.phase_timer.remaining()
    }

    /// Drops the submission channel and joins the worker, which finishes any
    /// in-flight yellow interlock before exiting (spec §5 Cancellation step 2).
    pub fn shutdown(self) {
        drop(self.job_tx);
        if let Some(handle) = self.worker {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::sim::SimLightLine;
    use crate::model::{Color, InternalEvent};
    use std::sync::mpsc::RecvTimeoutError;
    use std::time::Duration;

    fn tsem(location: i32) -> Arc<TrafficSemaphore> {
        Arc::new(TrafficSemaphore::new(
            location,
            vec![location + 4],
            Box::new(SimLightLine::new(location * 10)),
            Box::new(SimLightLine::new(location * 10 + 1)),
            Box::new(SimLightLine::new(location * 10 + 2)),
        ))
    }

    #[test]
    fn enqueued_transition_drives_lights_and_reports_timeout() {
        let (event_tx, event_rx) = mpsc::channel();
        let t0 = tsem(0);
        let scheduler = Scheduler::new(
            vec![Arc::clone(&t0)],
            vec![],
            event_tx,
            Arc::new(AtomicBool::new(false)),
        );

        scheduler.enqueue_transition(TransitionJob {
            next_idx: 1,
            green_time: Duration::from_millis(20),
            off_tsem: vec![],
            off_crosswalk: vec![],
            on_tsem: vec![0],
            on_crosswalk: vec![],
        });

        let mut saw_lights_timeout = false;
        for _ in 0..4 {
            match event_rx.recv_timeout(Duration::from_secs(2)) {
                Ok(Event::Internal(InternalEvent::LightsTimeout)) => {
                    saw_lights_timeout = true;
                    break;
                }
                Ok(_) => continue,
                Err(RecvTimeoutError::Timeout) => break,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        assert!(saw_lights_timeout);
        assert_eq!(t0.color(), Color::Green);
        assert_eq!(scheduler.current_phase_idx(), 1);
        scheduler.shutdown();
    }
}
