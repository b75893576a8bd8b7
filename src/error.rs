//! Crate-wide error aggregation.
//!
//! Each module keeps its own narrow error enum (`config::ConfigError`,
//! `cloud::CloudError`, `hal::HardwareWriteError`); [`ControlError`] unifies
//! them only where a caller needs to handle any of them together (the SET_UP
//! strategy, and the binary's top-level exit-code mapping).
use std::fmt;

use crate::cloud::CloudError;
use crate::config::ConfigError;
use crate::hal::HardwareWriteError;

/// Unified error type for the control plane.
#[derive(Debug)]
pub enum ControlError {
    Config(ConfigError),
    Cloud(CloudError),
    Hardware(HardwareWriteError),
}

impl fmt::Display for ControlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlError::Config(e) => write!(f, "configuration error: {}", e),
            ControlError::Cloud(e) => write!(f, "cloud error: {}", e),
            ControlError::Hardware(e) => write!(f, "hardware error: {}", e),
        }
    }
}

impl std::error::Error for ControlError {}

impl From<ConfigError> for ControlError {
    fn from(e: ConfigError) -> Self {
        ControlError::Config(e)
    }
}

impl From<CloudError> for ControlError {
    fn from(e: CloudError) -> Self {
        ControlError::Cloud(e)
    }
}

impl From<HardwareWriteError> for ControlError {
    fn from(e: HardwareWriteError) -> Self {
        ControlError::Hardware(e)
    }
}

/// Process exit codes, per the external-interface spec (0 clean, 1 fatal
/// runtime, 2 configuration invalid). Only `main()` should call this.
impl ControlError {
    pub fn exit_code(&self) -> i32 {
        match self {
            ControlError::Config(_) => 2,
            ControlError::Cloud(_) | ControlError::Hardware(_) => 1,
        }
    }
}
