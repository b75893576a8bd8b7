use serde::Deserialize;

use crate::config::ConfigError;

/// One entry of `correct_TSEM.json` (spec §4.A, §6.3).
#[derive(Debug, Clone, Deserialize)]
pub struct TsemEntry {
    pub name: String,
    pub location: i32,
    pub destinations: Vec<i32>,
    pub gpio_red: u32,
    pub gpio_green: u32,
    pub gpio_yellow: u32,
}

/// `^TS\d+$`, checked without a regex dependency since the shape is fixed
/// (spec §6.3).
fn matches_tsem_name(name: &str) -> bool {
    name.strip_prefix("TS")
        .is_some_and(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()))
}

impl TsemEntry {
    /// Applies the per-entry validation contract from spec §4.A: name
    /// pattern, and a non-empty `destinations` list (spec §8 Boundary
    /// behaviors: "Empty destinations list on any TSEM → ConfigInvalid").
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !matches_tsem_name(&self.name) {
            return Err(ConfigError::ConfigInvalid(format!(
                "TSEM name '{}' does not match ^TS\\d+$",
                self.name
            )));
        }
        if self.destinations.is_empty() {
            return Err(ConfigError::ConfigInvalid(format!(
                "TSEM {} has an empty destinations list",
                self.location
            )));
        }
        Ok(())
    }
}

/// Parses a `correct_TSEM.json` document (an array of [`TsemEntry`]).
pub fn parse_document(json: &serde_json::Value) -> Result<Vec<TsemEntry>, ConfigError> {
    serde_json::from_value(json.clone())
        .map_err(|e| ConfigError::ConfigInvalid(format!("malformed TSEM document: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rejects_empty_destinations() {
        let entry: TsemEntry = serde_json::from_value(json!({
            "name": "TS1",
            "location": 0,
            "destinations": [],
            "gpio_red": 1,
            "gpio_green": 2,
            "gpio_yellow": 3,
        }))
        .unwrap();
        assert!(matches!(entry.validate(), Err(ConfigError::ConfigInvalid(_))));
    }

    #[test]
    fn self_loop_destination_is_legal() {
        let entry: TsemEntry = serde_json::from_value(json!({
            "name": "TS1",
            "location": 0,
            "destinations": [0],
            "gpio_red": 1,
            "gpio_green": 2,
            "gpio_yellow": 3,
        }))
        .unwrap();
        assert!(entry.validate().is_ok());
    }
}
