use crate::hal::HardwareWriteError;
use crate::model::color::{buzzer_tone, Color};
use crate::model::semaphore::PedestrianSemaphore;

/// An ordered pair of pedestrian semaphores facing one another across a
/// vehicle lane (spec §3 Crosswalk). `psem1.location() < psem2.location()`
/// always; both signals are always driven to the same color, and the
/// crosswalk spans the vehicle locations strictly between them.
pub struct Crosswalk {
    psem1: PedestrianSemaphore,
    psem2: PedestrianSemaphore,
}

impl Crosswalk {
    /// Pairs two pedestrian semaphores into a crosswalk, ordering them by
    /// location (spec §4.A: "PSEMs are sorted by location and paired
    /// sequentially").
    pub fn new(a: PedestrianSemaphore, b: PedestrianSemaphore) -> Self {
        if a.location() < b.location() {
            Self { psem1: a, psem2: b }
        } else {
            Self { psem1: b, psem2: a }
        }
    }

    pub fn psem1(&self) -> &PedestrianSemaphore {
        &self.psem1
    }

    pub fn psem2(&self) -> &PedestrianSemaphore {
        &self.psem2
    }

    /// The open interval of vehicle locations this crosswalk spans.
    pub fn span(&self) -> (i32, i32) {
        (self.psem1.location(), self.psem2.location())
    }

    pub fn color(&self) -> Color {
        self.psem1.color()
    }

    /// Drives both signals to the same color (spec §3 invariant).
    pub fn switch_to(&self, color: Color) -> Result<(), HardwareWriteError> {
        self.psem1.switch_to(color)?;
        self.psem2.switch_to(color)?;
        Ok(())
    }

    /// Applies the buzzer policy (spec §4.C) to both signals for the given
    /// emergency state.
    pub fn update_buzzers(&self, emergency_active: bool) {
        let tone = buzzer_tone(self.color(), emergency_active);
        self.psem1.set_buzzer_tone(tone);
        self.psem2.set_buzzer_tone(tone);
    }

    /// True if either signal's button has already been honored this phase
    /// (spec §4.E NORMAL / §9: "if either PSEM in the crosswalk has counter
    /// > 1, it was already honored").
    pub fn already_extended(&self) -> bool {
        self.psem1.button_event_counter() > 1 || self.psem2.button_event_counter() > 1
    }

    pub fn reset_button_counters(&self) {
        self.psem1.reset_button_counter();
        self.psem2.reset_button_counter();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::sim::SimLightLine;

    fn psem(location: i32) -> PedestrianSemaphore {
        PedestrianSemaphore::new(
            location,
            Box::new(SimLightLine::new(location * 10)),
            Box::new(SimLightLine::new(location * 10 + 1)),
            None,
            None,
            None,
        )
    }

    #[test]
    fn crosswalk_orders_semaphores_by_location() {
        let crosswalk = Crosswalk::new(psem(3), psem(1));
        assert_eq!(crosswalk.span(), (1, 3));
    }

    #[test]
    fn crosswalk_drives_both_signals_together() {
        let crosswalk = Crosswalk::new(psem(1), psem(3));
        crosswalk.switch_to(Color::Green).unwrap();
        assert_eq!(crosswalk.psem1().color(), Color::Green);
        assert_eq!(crosswalk.psem2().color(), Color::Green);
    }
}
