use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use crate::hal::{Button, Buzzer, HardwareWriteError, LightLine, RfidReader};
use crate::model::color::Color;

/// Maps each supported [`Color`] to the GPIO line that drives it.
struct Lines {
    red: Box<dyn LightLine>,
    yellow: Option<Box<dyn LightLine>>,
    green: Box<dyn LightLine>,
}

impl Lines {
    fn write(&mut self, color: Color) -> Result<(), HardwareWriteError> {
        match color {
            Color::Red => {
                self.red.write(true)?;
                self.green.write(false)?;
                if let Some(y) = self.yellow.as_mut() {
                    y.write(false)?;
                }
            }
            Color::Yellow => {
                let y = self
                    .yellow
                    .as_mut()
                    .expect("yellow requested on a semaphore with no yellow line");
                self.red.write(false)?;
                self.green.write(false)?;
                y.write(true)?;
            }
            Color::Green => {
                self.red.write(false)?;
                self.green.write(true)?;
                if let Some(y) = self.yellow.as_mut() {
                    y.write(false)?;
                }
            }
        }
        Ok(())
    }
}

/// An indivisible traffic signal controlling vehicle movement out of one
/// location towards one or more `destinations` (spec §3 TrafficSemaphore).
/// Supports all three colors.
pub struct TrafficSemaphore {
    location: i32,
    destinations: Vec<i32>,
    lines: Mutex<Lines>,
    color: Mutex<Color>,
}

impl TrafficSemaphore {
    pub fn new(
        location: i32,
        destinations: Vec<i32>,
        red: Box<dyn LightLine>,
        yellow: Box<dyn LightLine>,
        green: Box<dyn LightLine>,
    ) -> Self {
        assert!(!destinations.is_empty(), "a TrafficSemaphore needs at least one destination");
        Self {
            location,
            destinations,
            lines: Mutex::new(Lines { red, yellow: Some(yellow), green }),
            color: Mutex::new(Color::Red),
        }
    }

    pub fn location(&self) -> i32 {
        self.location
    }

    pub fn destinations(&self) -> &[i32] {
        &self.destinations
    }

    pub fn color(&self) -> Color {
        *self.color.lock().unwrap()
    }

    /// Drives the signal to `color`, asserting the exactly-one-color
    /// invariant (spec §8 property 6): the old color's line is always
    /// switched off before the new one is switched on, by [`Lines::write`].
    pub fn switch_to(&self, color: Color) -> Result<(), HardwareWriteError> {
        self.lines.lock().unwrap().write(color)?;
        *self.color.lock().unwrap() = color;
        Ok(())
    }
}

/// A pedestrian crossing signal (spec §3 PedestrianSemaphore). Supports
/// only [`Color::Red`] and [`Color::Green`]; carries an optional button,
/// buzzer and RFID reader, plus a button-event counter that is reset on
/// every phase transition (see the Open Question resolution in
/// SPEC_FULL.md §12.1: the reset happens on transition *completion*).
pub struct PedestrianSemaphore {
    location: i32,
    lines: Mutex<Lines>,
    color: Mutex<Color>,
    button: Option<Mutex<Box<dyn Button>>>,
    buzzer: Option<Mutex<Box<dyn Buzzer>>>,
    rfid: Option<Mutex<Box<dyn RfidReader>>>,
    button_event_counter: AtomicU32,
}

impl PedestrianSemaphore {
    pub fn new(
        location: i32,
        red: Box<dyn LightLine>,
        green: Box<dyn LightLine>,
        button: Option<Box<dyn Button>>,
        buzzer: Option<Box<dyn Buzzer>>,
        rfid: Option<Box<dyn RfidReader>>,
    ) -> Self {
        Self {
            location,
            lines: Mutex::new(Lines { red, yellow: None, green }),
            color: Mutex::new(Color::Red),
            button: button.map(Mutex::new),
            buzzer: buzzer.map(Mutex::new),
            rfid: rfid.map(Mutex::new),
            button_event_counter: AtomicU32::new(0),
        }
    }

    pub fn location(&self) -> i32 {
        self.location
    }

    pub fn color(&self) -> Color {
        *self.color.lock().unwrap()
    }

    pub fn switch_to(&self, color: Color) -> Result<(), HardwareWriteError> {
        assert!(
            matches!(color, Color::Red | Color::Green),
            "pedestrian semaphores only support red/green (spec §3 invariant)"
        );
        self.lines.lock().unwrap().write(color)?;
        *self.color.lock().unwrap() = color;
        Ok(())
    }

    pub fn has_button(&self) -> bool {
        self.button.is_some()
    }

    /// Polls the button for a debounced press, incrementing the per-phase
    /// counter on each one (spec §5 "emit at most one PedestrianButtonEvent
    /// per debounced press").
    pub fn poll_button(&self) -> bool {
        let Some(button) = &self.button else { return false };
        let pressed = button.lock().unwrap().poll_edge().is_some();
        if pressed {
            self.button_event_counter.fetch_add(1, Ordering::SeqCst);
        }
        pressed
    }

    pub fn button_event_counter(&self) -> u32 {
        self.button_event_counter.load(Ordering::SeqCst)
    }

    /// Resets the button counter. Called by the scheduler worker once a
    /// transition into this phase's successor has completed (spec §12.1).
    pub fn reset_button_counter(&self) {
        self.button_event_counter.store(0, Ordering::SeqCst);
    }

    pub fn poll_rfid(&self) -> Option<u32> {
        self.rfid.as_ref().and_then(|r| r.lock().unwrap().poll_tag())
    }

    pub fn set_buzzer_tone(&self, tone: crate::model::color::BuzzerTone) {
        if let Some(buzzer) = &self.buzzer {
            buzzer.lock().unwrap().set_tone(tone);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::sim::SimLightLine;

    fn traffic(location: i32, destinations: Vec<i32>) -> TrafficSemaphore {
        TrafficSemaphore::new(
            location,
            destinations,
            Box::new(SimLightLine::new(location * 10)),
            Box::new(SimLightLine::new(location * 10 + 1)),
            Box::new(SimLightLine::new(location * 10 + 2)),
        )
    }

    #[test]
    fn traffic_semaphore_starts_red() {
        let sem = traffic(0, vec![4]);
        assert_eq!(sem.color(), Color::Red);
    }

    #[test]
    fn traffic_semaphore_switches_exclusively() {
        let sem = traffic(2, vec![6]);
        sem.switch_to(Color::Green).unwrap();
        assert_eq!(sem.color(), Color::Green);
        sem.switch_to(Color::Yellow).unwrap();
        assert_eq!(sem.color(), Color::Yellow);
        sem.switch_to(Color::Red).unwrap();
        assert_eq!(sem.color(), Color::Red);
    }

    #[test]
    #[should_panic]
    fn pedestrian_semaphore_rejects_yellow() {
        let sem = PedestrianSemaphore::new(
            1,
            Box::new(SimLightLine::new(1)),
            Box::new(SimLightLine::new(2)),
            None,
            None,
            None,
        );
        sem.switch_to(Color::Yellow).unwrap();
    }

    #[test]
    fn button_counter_tracks_presses_until_reset() {
        use crate::hal::sim::SimButton;
        use std::time::{Duration, Instant};

        let mut button = SimButton::new();
        let t0 = Instant::now();
        button.press_at(t0);
        button.press_at(t0 + Duration::from_secs(1));

        let sem = PedestrianSemaphore::new(
            1,
            Box::new(SimLightLine::new(1)),
            Box::new(SimLightLine::new(2)),
            Some(Box::new(button)),
            None,
            None,
        );

        assert!(sem.poll_button());
        assert_eq!(sem.button_event_counter(), 1);
        assert!(sem.poll_button());
        assert_eq!(sem.button_event_counter(), 2);
        sem.reset_button_counter();
        assert_eq!(sem.button_event_counter(), 0);
    }
}
