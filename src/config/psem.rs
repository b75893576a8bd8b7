use serde::Deserialize;

use crate::config::ConfigError;

/// One entry of `correct_PSEM.json` (spec §4.A, §6.3).
#[derive(Debug, Clone, Deserialize)]
pub struct PsemEntry {
    pub name: String,
    pub location: i32,
    pub gpio_red: u32,
    pub gpio_green: u32,
    #[serde(rename = "hasButton")]
    pub has_button: u8,
    #[serde(rename = "hasCardReader")]
    pub has_card_reader: u8,
    #[serde(rename = "hasBuzzer")]
    pub has_buzzer: u8,
    pub gpio_button: Option<u32>,
    #[serde(rename = "buttonThreshold")]
    pub button_threshold: Option<u32>,
}

/// `^PS\d+$`, checked without a regex dependency since the shape is fixed
/// (spec §6.3).
fn matches_psem_name(name: &str) -> bool {
    name.strip_prefix("PS")
        .is_some_and(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()))
}

impl PsemEntry {
    /// Applies the per-entry validation contract from spec §4.A: name
    /// pattern (§6.3), and `hasButton==1` requiring both `buttonThreshold`
    /// and `gpio_button`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !matches_psem_name(&self.name) {
            return Err(ConfigError::ConfigInvalid(format!(
                "PSEM name '{}' does not match ^PS\\d+$",
                self.name
            )));
        }
        if self.has_button == 1 && (self.gpio_button.is_none() || self.button_threshold.is_none()) {
            return Err(ConfigError::ConfigInvalid(format!(
                "PSEM {} has hasButton=1 but is missing gpio_button and/or buttonThreshold",
                self.location
            )));
        }
        Ok(())
    }
}

/// Parses a `correct_PSEM.json` document (an array of [`PsemEntry`]).
pub fn parse_document(json: &serde_json::Value) -> Result<Vec<PsemEntry>, ConfigError> {
    serde_json::from_value(json.clone())
        .map_err(|e| ConfigError::ConfigInvalid(format!("malformed PSEM document: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rejects_button_without_threshold() {
        let entry: PsemEntry = serde_json::from_value(json!({
            "name": "PS1",
            "location": 1,
            "gpio_red": 1,
            "gpio_green": 2,
            "hasButton": 1,
            "hasCardReader": 0,
            "hasBuzzer": 0,
        }))
        .unwrap();
        assert!(matches!(entry.validate(), Err(ConfigError::ConfigInvalid(_))));
    }

    #[test]
    fn accepts_well_formed_entry() {
        let entry: PsemEntry = serde_json::from_value(json!({
            "name": "PS1",
            "location": 1,
            "gpio_red": 1,
            "gpio_green": 2,
            "hasButton": 1,
            "hasCardReader": 0,
            "hasBuzzer": 0,
            "gpio_button": 3,
            "buttonThreshold": 50,
        }))
        .unwrap();
        assert!(entry.validate().is_ok());
    }
}
