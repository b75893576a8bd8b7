//! # TrafficControlSystem
//!
//! The process-level singleton (spec §3 System, §10): owns the mediator's
//! event channel, spawns the cloud worker and the mediator consumer
//! thread, and forwards the emergency-bus collaborator onto the same
//! queue. Boots straight into SET_UP (spec §4.A); `shutdown` is the only
//! way out, and follows the Cancellation order from spec §5.
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::cloud::{spawn_cloud_worker, CloudClient};
use crate::config::HardwareFactory;
use crate::emergency_bus::{EmergencyBus, EmergencyBusEvent};
use crate::error::ControlError;
use crate::log_main;
use crate::mediator::Mediator;
use crate::model::Event;
use crate::strategy::{strategy_for, ControllerContext, SystemState};
use crate::verbose::EVENT_SHUTDOWN;

/// Owns every thread the controller spawns for the life of the process:
/// the mediator consumer, the cloud worker, and (if wired) the
/// emergency-bus subscriber.
pub struct TrafficControlSystem {
    event_tx: Sender<Event>,
    mediator_handle: JoinHandle<ControllerContext>,
    cloud_worker: JoinHandle<()>,
    emergency_bus_handle: Option<JoinHandle<()>>,
    failed: Arc<AtomicBool>,
}

impl TrafficControlSystem {
    /// Boots the controller: spawns the cloud worker, then the mediator
    /// consumer thread running SET_UP first (spec §4.A, §10). If
    /// `emergency_bus` is given, a subscriber thread forwards its
    /// occurrences onto the same event queue as `EmergencyStart`/
    /// `EmergencyFinish` (spec §7 DDSMatchLost: unmatch is EmergencyFinish,
    /// not an error).
    pub fn new(
        cloud_client: Arc<dyn CloudClient>,
        hw: Box<dyn HardwareFactory>,
        tmcid: impl Into<String>,
        controlbox_id: impl Into<String>,
        emergency_bus: Option<Box<dyn EmergencyBus>>,
    ) -> Self {
        let (event_tx, event_rx) = mpsc::channel::<Event>();
        let (cloud_tx, cloud_worker) =
            spawn_cloud_worker(cloud_client, event_tx.clone(), tmcid.into(), controlbox_id.into());

        let failed = Arc::new(AtomicBool::new(false));
        let ctx = ControllerContext::new(cloud_tx, event_tx.clone(), hw, Arc::clone(&failed));
        let mediator = Mediator::new(event_rx);

        let mediator_handle = thread::Builder::new()
            .name("mediator-consumer".to_string())
            .spawn(move || mediator.run(ctx, strategy_for(SystemState::SetUp)))
            .expect("failed to spawn mediator consumer thread");

        let emergency_bus_handle = emergency_bus.map(|bus| {
            let tx = event_tx.clone();
            thread::Builder::new()
                .name("emergency-bus-subscriber".to_string())
                .spawn(move || forward_emergency_bus(bus, tx))
                .expect("failed to spawn emergency bus subscriber thread")
        });

        Self { event_tx, mediator_handle, cloud_worker, emergency_bus_handle, failed }
    }

    /// A cloneable handle external producers (a webhook handler, a test
    /// harness) can use to push events onto the mediator queue alongside
    /// the button/RFID watchers and the emergency-bus subscriber.
    pub fn event_sender(&self) -> Sender<Event> {
        self.event_tx.clone()
    }

    /// True once a strategy has escalated into FAILURE (spec §4.E FAILURE).
    /// `controlbox` polls this alongside its OS shutdown signal so an
    /// autonomous escalation ends the process instead of hanging forever
    /// waiting for SIGINT/SIGTERM.
    pub fn is_failed(&self) -> bool {
        self.failed.load(Ordering::SeqCst)
    }

    /// Graceful shutdown (spec §5 Cancellation): signal the mediator to
    /// stop draining, join it to retrieve the final `ControllerContext`,
    /// stop the watcher threads it spawned, drive every element red, then
    /// release the scheduler and cloud worker. Returns the fatal error a
    /// strategy recorded, if SET_UP or a runtime escalation ended in
    /// FAILURE, so `controlbox`'s `main` can pick an exit code.
    pub fn shutdown(self) -> Result<(), ControlError> {
        log_main!(EVENT_SHUTDOWN, "shutdown requested", reason = "graceful");
        let _ = self.event_tx.send(Event::Shutdown);
        drop(self.event_tx);

        let mut ctx = self.mediator_handle.join().expect("mediator consumer thread panicked");

        ctx.join_watchers();
        ctx.drive_all_red();

        let scheduler = ctx.take_scheduler();
        let fatal_error = ctx.fatal_error.take();
        // Dropping `ctx` releases the last `Sender<CloudRequest>`, which is
        // what lets the cloud worker's `for request in rx.iter()` loop end.
        drop(ctx);

        if let Some(scheduler) = scheduler {
            scheduler.shutdown();
        }
        let _ = self.cloud_worker.join();
        if let Some(handle) = self.emergency_bus_handle {
            let _ = handle.join();
        }

        match fatal_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

fn forward_emergency_bus(bus: Box<dyn EmergencyBus>, event_tx: Sender<Event>) {
    loop {
        match bus.recv() {
            Ok(EmergencyBusEvent::Start { plate, origin, destination, priority }) => {
                let _ = event_tx.send(Event::EmergencyStart {
                    plate,
                    location: origin,
                    direction: destination,
                    priority,
                });
            }
            Ok(EmergencyBusEvent::Finish) => {
                let _ = event_tx.send(Event::EmergencyFinish);
            }
            Err(_) => break,
        }
    }
}
