//! SET_UP (spec §4.E): fetches the PSEM/TSEM configuration from the cloud,
//! validates and materializes it, builds the conflict graph and phase
//! table, starts the scheduler and the button/RFID watcher threads, then
//! hands off to NORMAL. Any validation failure here is fatal (spec §4.A,
//! §6.5 exit code 2).
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::cloud::{CloudError, CloudRequest};
use crate::conflict::{enumerate_phases, ConflictGraph};
use crate::config;
use crate::error::ControlError;
use crate::model::{CloudResponse, Crosswalk, Event, InternalEvent, TrafficSemaphore};
use crate::scheduler::Scheduler;
use crate::verbose::{
    EVENT_CONFLICT_GRAPH_BUILT, EVENT_PHASES_ENUMERATED, EVENT_SETUP_CONFIGURE_SENT, EVENT_STATE_CHANGE,
};
use crate::{log_all, log_main};

use super::{ControllerContext, Strategy, SystemState};

/// All-red warning held before NORMAL cycling begins (spec §4.A "SET_UP
/// submits an all-red warning transition for 5s"). Not a [`super::context::ControllerContext::submit_transition`]
/// job: there is no "current phase" yet to transition away from, so this is
/// a plain hold rather than a scheduled job.
const ALL_RED_WARNING: Duration = Duration::from_secs(5);

pub struct SetUpStrategy {
    psem_config: Option<serde_json::Value>,
    tsem_config: Option<serde_json::Value>,
}

impl SetUpStrategy {
    pub fn new() -> Self {
        Self { psem_config: None, tsem_config: None }
    }

    fn try_complete(&mut self, ctx: &mut ControllerContext) -> Option<SystemState> {
        let (Some(psem_json), Some(tsem_json)) = (self.psem_config.take(), self.tsem_config.take()) else {
            return None;
        };

        let mut hw = ctx.hw.take().expect("hardware factory consumed twice during SET_UP");
        let loaded = match config::load(&psem_json, &tsem_json, hw.as_mut()) {
            Ok(loaded) => loaded,
            Err(err) => {
                ctx.fatal_error = Some(ControlError::Config(err));
                return Some(SystemState::Failure);
            }
        };

        let graph = ConflictGraph::build(&loaded.tsems, &loaded.crosswalks, loaded.max_location);
        log_main!(EVENT_CONFLICT_GRAPH_BUILT, "conflict graph built", max_location = loaded.max_location);

        let phases = enumerate_phases(&graph, &loaded.tsems, &loaded.crosswalks);
        log_main!(EVENT_PHASES_ENUMERATED, "phases enumerated", count = phases.len());

        let tsems: Vec<Arc<TrafficSemaphore>> = loaded.tsems.into_iter().map(Arc::new).collect();
        let crosswalks: Vec<Arc<Crosswalk>> = loaded.crosswalks.into_iter().map(Arc::new).collect();

        let scheduler = Scheduler::new(
            tsems.clone(),
            crosswalks.clone(),
            ctx.event_tx.clone(),
            Arc::clone(&ctx.emergency_active),
        );

        ctx.tsems = tsems;
        ctx.crosswalks = crosswalks;
        ctx.max_location = loaded.max_location;
        ctx.phases = phases;
        ctx.scheduler = Some(scheduler);
        ctx.log_setup_complete();

        ctx.start_watchers();

        if ctx.phases.is_empty() {
            // spec §8 boundary: maxLocation == 0 -> no phases emitted, SET_UP
            // ends without starting cycling.
            log_main!(EVENT_STATE_CHANGE, "entering NORMAL with no phases to cycle", phases = 0);
            return Some(SystemState::Normal);
        }

        // All elements already start RED (spec §3 invariant); this is a
        // deliberate pause before the first real transition, not a write.
        thread::sleep(ALL_RED_WARNING);

        ctx.submit_transition(0, None);
        log_main!(EVENT_STATE_CHANGE, "SET_UP complete, entering NORMAL", phases = ctx.phases.len());
        Some(SystemState::Normal)
    }
}

impl Default for SetUpStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl Strategy for SetUpStrategy {
    fn handle(&mut self, ctx: &mut ControllerContext, event: Event) -> Option<SystemState> {
        match event {
            Event::Internal(InternalEvent::NewStateEntered) => {
                let _ = ctx.cloud_tx.send(CloudRequest::Configure);
                log_main!(EVENT_SETUP_CONFIGURE_SENT, "requested PSEM/TSEM configuration from cloud", attempt = 1);
                None
            }
            Event::Cloud(CloudResponse::PsemConfig(json)) => {
                self.psem_config = Some(json);
                log_all!(EVENT_SETUP_CONFIGURE_SENT, "PSEM configuration received", received = 1);
                self.try_complete(ctx)
            }
            Event::Cloud(CloudResponse::TsemConfig(json)) => {
                self.tsem_config = Some(json);
                log_all!(EVENT_SETUP_CONFIGURE_SENT, "TSEM configuration received", received = 1);
                self.try_complete(ctx)
            }
            Event::Internal(InternalEvent::CloudFault { detail }) => {
                ctx.fatal_error = Some(ControlError::Cloud(CloudError::Persistent(detail)));
                Some(SystemState::Failure)
            }
            _ => None,
        }
    }
}
