//! # Event Mediator + Strategy Dispatcher
//!
//! A single unbounded FIFO accepts [`Event`]s from any number of producers
//! (button/RFID watcher threads, the cloud worker, the scheduler worker,
//! the emergency-bus subscriber) and one consumer thread drains it,
//! dispatching each event to the [`crate::strategy::Strategy`] installed for
//! the current state (spec §4.D). The consumer performs no I/O itself: it
//! only mutates [`crate::strategy::ControllerContext`] and asks the
//! scheduler/cloud worker to act.
//!
//! `std::sync::mpsc` already gives FIFO-per-sender plus safe multi-producer
//! fan-in, so this module needs no hand-rolled mutex+condvar queue (spec §4.D,
//! REDESIGN FLAGS): dropping every `Sender` clone naturally ends the
//! `Receiver`'s iteration, and an explicit [`Event::Shutdown`] remains a
//! fast-path for "stop draining even if producers are still alive" (spec §5).
use std::sync::mpsc::Receiver;

use crate::model::{Event, InternalEvent};
use crate::strategy::{strategy_for, ControllerContext, Strategy};

/// Owns the consumer side of the event queue. [`Mediator::run`] blocks the
/// calling thread until shutdown, then hands the (possibly state-mutated)
/// [`ControllerContext`] back to the caller so `control.rs` can finish
/// tearing down anything the context spawned (watcher threads).
pub struct Mediator {
    rx: Receiver<Event>,
}

impl Mediator {
    pub fn new(rx: Receiver<Event>) -> Self {
        Self { rx }
    }

    /// Drains events against the strategy chain SET_UP → NORMAL →
    /// EMERGENCY → NORMAL → ... (→ FAILURE), starting from `initial`. Every
    /// strategy swap immediately re-dispatches `NewStateEntered` to the new
    /// strategy before the next queued event is drained (spec §4.E "On
    /// entry" clauses).
    pub fn run(mut self, mut ctx: ControllerContext, initial: Box<dyn Strategy>) -> ControllerContext {
        let mut strategy = initial;
        let mut pending = Some(Event::Internal(InternalEvent::NewStateEntered));

        loop {
            let event = match pending.take() {
                Some(event) => event,
                None => match self.rx.recv() {
                    Ok(event) => event,
                    Err(_) => break,
                },
            };

            if matches!(event, Event::Shutdown) {
                break;
            }

            if let Some(next_state) = strategy.handle(&mut ctx, event) {
                strategy = strategy_for(next_state);
                pending = Some(Event::Internal(InternalEvent::NewStateEntered));
            }
        }

        ctx
    }
}
