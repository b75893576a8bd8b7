//! # State Strategies
//!
//! SET_UP, NORMAL, EMERGENCY and FAILURE (spec §4.E) as four structs behind
//! a shared [`Strategy`] trait, dispatched by [`crate::mediator::Mediator`].
//! Each strategy owns only the per-state bookkeeping it needs between
//! events (e.g. [`set_up::SetUpStrategy`] buffering the two halves of the
//! cloud configuration); everything that survives a state change lives in
//! [`ControllerContext`].
mod context;
mod emergency;
mod failure;
mod normal;
mod set_up;

pub use context::ControllerContext;
pub use emergency::EmergencyStrategy;
pub use failure::FailureStrategy;
pub use normal::NormalStrategy;
pub use set_up::SetUpStrategy;

use crate::model::Event;

/// The controller's coarse-grained mode (spec §3 SystemState / §4 State
/// Machine). `Mediator::run` walks SET_UP → NORMAL → EMERGENCY → NORMAL →
/// ... (→ FAILURE), never back out of FAILURE.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemState {
    SetUp,
    Normal,
    Emergency,
    Failure,
}

/// One state's event-handling policy. `handle` mutates [`ControllerContext`]
/// and returns `Some(next_state)` to request a strategy swap, or `None` to
/// stay put (spec §6 "Each strategy is a struct implementing a shared
/// trait").
pub trait Strategy: Send {
    fn handle(&mut self, ctx: &mut ControllerContext, event: Event) -> Option<SystemState>;
}

/// Factory from [`SystemState`] to the strategy instance that implements it
/// (spec §4.D "the mediator consults a small table/match keyed by the
/// current state").
pub fn strategy_for(state: SystemState) -> Box<dyn Strategy> {
    match state {
        SystemState::SetUp => Box::new(SetUpStrategy::new()),
        SystemState::Normal => Box::new(NormalStrategy),
        SystemState::Emergency => Box::new(EmergencyStrategy),
        SystemState::Failure => Box::new(FailureStrategy),
    }
}
