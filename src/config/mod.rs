//! # Configuration Loader
//!
//! Validates the PSEM/TSEM JSON documents delivered by the cloud
//! collaborator during SET_UP (spec §4.A), allocates GPIO lines against the
//! allow-list (spec §6.4), and constructs the [`TrafficSemaphore`],
//! [`PedestrianSemaphore`] and [`Crosswalk`] entities the rest of the core
//! owns for the life of the process.
//!
//! Every validation failure aborts SET_UP and is fatal (spec §4.A, §6.5
//! exit code 2); [`load`] is a pure function so it can be exercised in
//! tests without a running cloud client.
pub mod error;
pub mod gpio;
pub mod hardware;
pub mod loader;
pub mod psem;
pub mod tsem;

pub use error::ConfigError;
pub use hardware::{HardwareFactory, SimHardwareFactory};
pub use loader::{load, LoadedConfig};

use crate::model::{Crosswalk, TrafficSemaphore};

/// Every `TrafficSemaphore`/`PedestrianSemaphore`/`Crosswalk` location
/// allocated during SET_UP, ready for the conflict planner (spec §4.A).
pub struct ElementTables {
    pub tsems: Vec<TrafficSemaphore>,
    pub crosswalks: Vec<Crosswalk>,
    pub max_location: i32,
}
