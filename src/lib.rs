//! # Intersection Control Core
//!
//! Core control plane for a single intersection: a small fleet of traffic
//! semaphores and pedestrian crosswalks, driven by a conflict-graph phase
//! planner and an event-driven scheduler/state-machine.
//!
//! ## Architecture
//!
//! ```text
//! config::load   -> model::{TrafficSemaphore, PedestrianSemaphore, Crosswalk}
//!                          |
//!                          v
//! conflict::enumerate_phases -> Vec<model::Phase>
//!                          |
//!                          v
//! control::TrafficControlSystem
//!    ├── mediator::Mediator      (single event queue, one consumer thread)
//!    ├── scheduler::Scheduler    (worker thread: red/yellow/green timing)
//!    └── strategy::{SetUp, Normal, Emergency, Failure}  (per-state policy)
//! ```
//!
//! External collaborators (cloud management service, emergency pub/sub,
//! GPIO/PWM/SPI hardware) are reduced to narrow traits in [`cloud`],
//! [`emergency_bus`] and [`hal`]; this crate does not implement their wire
//! protocols.
//!
//! ## Components
//!
//! - [`config`] - validates PSEM/TSEM documents, allocates GPIO lines
//! - [`model`] - Semaphore, Crosswalk, Phase, EmergencyContext, Event
//! - [`conflict`] - conflict graph construction and maximal independent set enumeration
//! - [`scheduler`] - phase timer, yellow interlock, transition worker
//! - [`mediator`] - single event queue and per-state dispatch
//! - [`strategy`] - SET_UP / NORMAL / EMERGENCY / FAILURE policies
//! - [`control`] - the `TrafficControlSystem` singleton
//! - [`cloud`], [`emergency_bus`], [`hal`] - external collaborator interfaces
//! - [`verbose`] - structured logging
pub mod config;
pub mod model;
pub mod conflict;
pub mod scheduler;
pub mod mediator;
pub mod strategy;
pub mod cloud;
pub mod emergency_bus;
pub mod hal;
pub mod control;
pub mod error;
pub mod verbose;

pub use control::TrafficControlSystem;
pub use error::ControlError;
