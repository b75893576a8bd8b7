use std::fmt;

/// The three colors a traffic signal can show. Pedestrian signals only ever
/// carry [`Color::Red`] or [`Color::Green`] (spec §3 PedestrianSemaphore).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Red,
    Yellow,
    Green,
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Color::Red => "red",
            Color::Yellow => "yellow",
            Color::Green => "green",
        };
        write!(f, "{}", s)
    }
}

/// Buzzer tone driven alongside a pedestrian signal's color (spec §4.C
/// "Buzzer policy during transitions").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuzzerTone {
    Silent,
    /// 2 Hz, while the signal is green.
    Slow,
    /// 4 kHz, while red during an active emergency.
    Fast,
}

/// Derives the buzzer tone for a pedestrian signal from its current color
/// and whether an emergency is currently being honored.
pub fn buzzer_tone(color: Color, emergency_active: bool) -> BuzzerTone {
    match color {
        Color::Green => BuzzerTone::Slow,
        Color::Red if emergency_active => BuzzerTone::Fast,
        _ => BuzzerTone::Silent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buzzer_tone_policy() {
        assert_eq!(buzzer_tone(Color::Green, false), BuzzerTone::Slow);
        assert_eq!(buzzer_tone(Color::Green, true), BuzzerTone::Slow);
        assert_eq!(buzzer_tone(Color::Red, true), BuzzerTone::Fast);
        assert_eq!(buzzer_tone(Color::Red, false), BuzzerTone::Silent);
        assert_eq!(buzzer_tone(Color::Yellow, true), BuzzerTone::Silent);
    }
}
