//! FAILURE (spec §4.E): terminal safety state. Entry drives every element
//! red directly, bypassing the scheduler and yellow interlock entirely;
//! no further event moves the controller out of this state short of
//! process restart.
use crate::model::{Event, InternalEvent};
use crate::verbose::EVENT_FAILURE_ENTERED;
use crate::log_main;

use super::{ControllerContext, Strategy, SystemState};

pub struct FailureStrategy;

impl Strategy for FailureStrategy {
    fn handle(&mut self, ctx: &mut ControllerContext, event: Event) -> Option<SystemState> {
        if let Event::Internal(InternalEvent::NewStateEntered) = event {
            log_main!(EVENT_FAILURE_ENTERED, "entering FAILURE, driving all elements red", tsems = ctx.tsems.len());
            ctx.drive_all_red();
            ctx.mark_failed();
        }
        None
    }
}
