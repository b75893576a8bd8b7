use std::fmt;

/// Configuration validation failures (spec §4.A, §7). Every variant is
/// fatal at SET_UP and maps to exit code 2 (spec §6.5).
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// Missing required field, or `hasButton==1` without `buttonThreshold`
    /// and `gpio_button`.
    ConfigInvalid(String),
    /// A `location` appearing twice across PSEMs and TSEMs together.
    LocationCollision(i32),
    /// A GPIO line not in the allow-list, or already assigned.
    GpioCollision(u32),
    /// An odd count of PedestrianSemaphores.
    CrosswalkPairing(usize),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ConfigInvalid(detail) => write!(f, "invalid configuration: {}", detail),
            ConfigError::LocationCollision(loc) => {
                write!(f, "location {} is assigned to more than one semaphore", loc)
            }
            ConfigError::GpioCollision(line) => {
                write!(f, "GPIO line {} is outside the allow-list or already assigned", line)
            }
            ConfigError::CrosswalkPairing(count) => {
                write!(f, "pedestrian semaphore count ({}) is odd, crosswalks must pair up", count)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
