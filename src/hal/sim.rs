//! In-memory reference implementations of the [`super`] traits, used by
//! tests and by the `controlbox` binary when no real hardware is attached.
use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::hal::{Button, Buzzer, HardwareWriteError, LightLine, RfidReader};
use crate::model::color::BuzzerTone;

/// A light line that just remembers whether it is on, for assertions in
/// tests and for logging in the headless binary.
#[derive(Debug, Clone)]
pub struct SimLightLine {
    pub line: u32,
    pub on: bool,
    pub fail_next: bool,
}

impl SimLightLine {
    pub fn new(line: u32) -> Self {
        Self { line, on: false, fail_next: false }
    }
}

impl LightLine for SimLightLine {
    fn write(&mut self, on: bool) -> Result<(), HardwareWriteError> {
        if self.fail_next {
            self.fail_next = false;
            return Err(HardwareWriteError {
                line: self.line,
                detail: "simulated write failure".to_string(),
            });
        }
        self.on = on;
        Ok(())
    }
}

/// A button backed by a queue of press timestamps, debounced at 200ms.
pub struct SimButton {
    presses: VecDeque<Instant>,
    last_accepted: Option<Instant>,
}

const DEBOUNCE_WINDOW: Duration = Duration::from_millis(200);

impl SimButton {
    pub fn new() -> Self {
        Self { presses: VecDeque::new(), last_accepted: None }
    }

    /// Queue a press at the given instant, as the button ISR would.
    pub fn press_at(&mut self, at: Instant) {
        self.presses.push_back(at);
    }
}

impl Default for SimButton {
    fn default() -> Self {
        Self::new()
    }
}

impl Button for SimButton {
    fn poll_edge(&mut self) -> Option<Instant> {
        while let Some(at) = self.presses.pop_front() {
            if let Some(last) = self.last_accepted {
                if at.duration_since(last) < DEBOUNCE_WINDOW {
                    continue;
                }
            }
            self.last_accepted = Some(at);
            return Some(at);
        }
        None
    }
}

/// An RFID reader backed by a queue of tag reads.
#[derive(Default)]
pub struct SimRfidReader {
    tags: VecDeque<u32>,
}

impl SimRfidReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_tag(&mut self, uuid: u32) {
        self.tags.push_back(uuid);
    }
}

impl RfidReader for SimRfidReader {
    fn poll_tag(&mut self) -> Option<u32> {
        self.tags.pop_front()
    }
}

/// A buzzer that just records the last tone it was asked to play.
#[derive(Debug, Clone, Default)]
pub struct SimBuzzer {
    pub last_tone: Option<BuzzerTone>,
}

impl Buzzer for SimBuzzer {
    fn set_tone(&mut self, tone: BuzzerTone) {
        self.last_tone = Some(tone);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn button_debounces_within_window() {
        let mut button = SimButton::new();
        let t0 = Instant::now();
        button.press_at(t0);
        button.press_at(t0 + Duration::from_millis(50));
        button.press_at(t0 + Duration::from_millis(250));

        assert_eq!(button.poll_edge(), Some(t0));
        assert_eq!(button.poll_edge(), Some(t0 + Duration::from_millis(250)));
        assert_eq!(button.poll_edge(), None);
    }

    #[test]
    fn light_line_reports_failure_once() {
        let mut line = SimLightLine::new(5);
        line.fail_next = true;
        assert!(line.write(true).is_err());
        assert!(line.write(true).is_ok());
        assert!(line.on);
    }
}
