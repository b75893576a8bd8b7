//! # Hardware abstraction layer
//!
//! Narrow traits for the GPIO/PWM/SPI-backed devices the core drives:
//! light lines, pushbuttons, RFID readers, and buzzers. The kernel-mode
//! drivers, SPI wiring and PWM duty-cycle math are out of scope (spec §1);
//! this module only specifies the interface the core consumes, plus an
//! in-memory reference implementation ([`sim`]) used by tests and by the
//! binary when run without real hardware attached.
pub mod sim;

use std::fmt;

use crate::model::color::BuzzerTone;

/// A single physical light line (one per semaphore/color pair). Spec §5:
/// "each physical GPIO line has a single owner" — the scheduler worker is
/// that owner and is the only caller of `write`.
pub trait LightLine: Send {
    fn write(&mut self, on: bool) -> Result<(), HardwareWriteError>;
}

/// A debounced pushbutton. `poll_edge` returns the instant of a rising edge
/// once per physical press, after the 200ms debounce window (spec §5, §9).
pub trait Button: Send {
    fn poll_edge(&mut self) -> Option<std::time::Instant>;
}

/// An RFID reader attached to a pedestrian semaphore.
pub trait RfidReader: Send {
    fn poll_tag(&mut self) -> Option<u32>;
}

/// A buzzer driven at the tone dictated by [`crate::model::color::buzzer_tone`].
pub trait Buzzer: Send {
    fn set_tone(&mut self, tone: BuzzerTone);
}

/// A GPIO/PWM/SPI write that failed. Logged and retried once by the
/// scheduler worker (spec §7 HardwareWriteError); a second failure
/// escalates the controller to FAILURE.
#[derive(Debug, Clone)]
pub struct HardwareWriteError {
    pub line: u32,
    pub detail: String,
}

impl fmt::Display for HardwareWriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "write to GPIO line {} failed: {}", self.line, self.detail)
    }
}

impl std::error::Error for HardwareWriteError {}
