//! EMERGENCY (spec §4.E): pre-empts the phase cycle for the head of
//! `ControllerContext::emergency_queue`, holding NORMAL cycling paused
//! until the emergency vehicle clears. Additional emergencies queue behind
//! the one currently being honored rather than re-triggering pre-emption.
use std::sync::atomic::Ordering;

use crate::cloud::CloudRequest;
use crate::model::{EmergencyContext, Event, InternalEvent};
use crate::verbose::EVENT_EMERGENCY_PREEMPT;
use crate::{log_main, log_additional};

use super::{ControllerContext, Strategy, SystemState};

pub struct EmergencyStrategy;

impl Strategy for EmergencyStrategy {
    fn handle(&mut self, ctx: &mut ControllerContext, event: Event) -> Option<SystemState> {
        match event {
            Event::Internal(InternalEvent::NewStateEntered) => {
                let Some(head) = ctx.emergency_queue.front().cloned() else {
                    return Some(SystemState::Normal);
                };
                ctx.emergency_active.store(true, Ordering::SeqCst);
                log_main!(
                    EVENT_EMERGENCY_PREEMPT,
                    "honoring emergency pre-emption request",
                    origin = head.origin_location
                );
                preempt_for(ctx, &head);

                let _ = ctx.cloud_tx.send(CloudRequest::EmergencyRecord(head));
                ctx.emergency_queue.pop_front();
                None
            }

            Event::Internal(InternalEvent::YellowTimeout) => {
                if let Some(scheduler) = &ctx.scheduler {
                    scheduler.early_fire();
                }
                None
            }

            // A second emergency request arriving while the first is still
            // being honored just queues behind it (spec §4.E "the head is
            // the currently honored emergency").
            Event::EmergencyStart { plate, location, direction, priority } => {
                ctx.emergency_queue.push_back(EmergencyContext::new(plate, location, direction, priority));
                None
            }

            Event::EmergencyFinish => {
                ctx.emergency_active.store(false, Ordering::SeqCst);
                ctx.advance_to_next_phase();
                Some(SystemState::Normal)
            }

            // Everything else (LIGHTS_TIMEOUT, pedestrian/RFID, cloud
            // responses, hardware/cloud faults) is buffered and ignored
            // while an emergency is being honored (spec §4.E EMERGENCY).
            _ => None,
        }
    }
}

/// If the emergency's origin is not already green in the current phase,
/// early-fires the in-flight dwell and submits a transition to the first
/// phase whose TSEMs serve that origin (spec §4.E EMERGENCY entry action).
fn preempt_for(ctx: &mut ControllerContext, head: &EmergencyContext) {
    if ctx.phases.is_empty() {
        return;
    }
    let current_idx = ctx.current_phase_idx();
    if ctx.phases[current_idx].contains_tsem(head.origin_location) {
        log_additional!(EVENT_EMERGENCY_PREEMPT, "origin already green, no pre-emption needed", current_idx = current_idx);
        return;
    }
    let Some(target_idx) = ctx.phases.iter().position(|p| p.contains_tsem(head.origin_location)) else {
        return;
    };
    if let Some(scheduler) = &ctx.scheduler {
        scheduler.early_fire();
    }
    ctx.submit_transition(target_idx, None);
}
