//! Factory seam between the configuration loader and the [`crate::hal`]
//! traits. `load` never constructs GPIO lines directly: it asks a
//! [`HardwareFactory`] for one per allocated line, so tests can hand in
//! in-memory devices and the `controlbox` binary can hand in real ones
//! (spec §1: the core never talks to a kernel driver directly).
use crate::hal::sim::{SimBuzzer, SimLightLine, SimRfidReader};
use crate::hal::{Button, Buzzer, LightLine, RfidReader};

/// Builds one device per claimed GPIO line. Implementations own whatever
/// kernel handles (sysfs, `/dev/gpiochip*`, SPI device files) the line
/// requires; the loader only ever sees the trait objects. `Send` because a
/// `Box<dyn HardwareFactory>` lives inside `ControllerContext`, which is
/// moved onto the mediator consumer thread at boot.
pub trait HardwareFactory: Send {
    fn light_line(&mut self, gpio: u32) -> Box<dyn LightLine>;
    fn button(&mut self, gpio: u32) -> Box<dyn Button>;
    fn rfid_reader(&mut self, gpio: u32) -> Box<dyn RfidReader>;
    fn buzzer(&mut self, gpio: u32) -> Box<dyn Buzzer>;
}

/// The default factory used by tests and by `controlbox` when run without
/// real hardware attached: every device is an in-memory [`crate::hal::sim`]
/// stand-in, tagged with the GPIO line it was allocated for diagnostics.
#[derive(Default)]
pub struct SimHardwareFactory;

impl SimHardwareFactory {
    pub fn new() -> Self {
        Self
    }
}

impl HardwareFactory for SimHardwareFactory {
    fn light_line(&mut self, gpio: u32) -> Box<dyn LightLine> {
        Box::new(SimLightLine::new(gpio))
    }

    fn button(&mut self, _gpio: u32) -> Box<dyn Button> {
        Box::new(crate::hal::sim::SimButton::new())
    }

    fn rfid_reader(&mut self, _gpio: u32) -> Box<dyn RfidReader> {
        Box::new(SimRfidReader::new())
    }

    fn buzzer(&mut self, _gpio: u32) -> Box<dyn Buzzer> {
        Box::new(SimBuzzer::default())
    }
}
