//! # Data model
//!
//! The entities a single intersection is made of: [`Semaphore`]s (traffic
//! and pedestrian), [`Crosswalk`]s pairing pedestrian semaphores, [`Phase`]s
//! (maximal sets of simultaneously-green elements) and the
//! [`EmergencyContext`] FIFO.
//!
//! Ownership follows the controller: the [`TrafficControlSystem`](crate::control::TrafficControlSystem)
//! owns every `TrafficSemaphore`/`PedestrianSemaphore`/`Crosswalk`/`Phase`
//! created at boot. `Phase`s hold non-owning back-references to elements by
//! integer `location` and never outlive the owner.
pub mod color;
pub mod semaphore;
pub mod crosswalk;
pub mod phase;
pub mod emergency;
pub mod event;

pub use color::Color;
pub use semaphore::{PedestrianSemaphore, TrafficSemaphore};
pub use crosswalk::Crosswalk;
pub use phase::Phase;
pub use emergency::EmergencyContext;
pub use event::{CloudResponse, Event, InternalEvent};

/// Default nominal green duration for a phase, in seconds (spec §3 Phase).
pub const DEFAULT_SWITCHING_TIME: u32 = 5;
/// Fixed yellow-interlock duration, in seconds (spec §4.C, a safety invariant).
pub const YELLOW_DURATION: u32 = 2;
/// Floor below which a pedestrian-button extension is refused (spec §4.C).
pub const MIN_SECONDS: u32 = 10;
/// Amount by which a pedestrian-button press shortens the remaining green (spec §4.C).
pub const REDUCE_SECONDS: u32 = 5;
