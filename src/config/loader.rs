//! The SET_UP validation contract (spec §4.A): parses the PSEM/TSEM
//! documents, allocates GPIO lines against the allow-list, pairs
//! pedestrian semaphores into crosswalks, and materializes the
//! [`ElementTables`](super::ElementTables) the rest of the core owns.
use std::collections::HashSet;

use crate::config::gpio::GpioAllocator;
use crate::config::hardware::HardwareFactory;
use crate::config::psem::{self, PsemEntry};
use crate::config::tsem::{self, TsemEntry};
use crate::config::{ConfigError, ElementTables};
use crate::model::{Crosswalk, PedestrianSemaphore, TrafficSemaphore};

/// Alias kept distinct from [`ElementTables`] at the call site: `load`
/// returns a `LoadedConfig`, which today is exactly an `ElementTables`.
pub type LoadedConfig = ElementTables;

/// Validates and materializes the PSEM/TSEM documents retrieved from the
/// cloud during SET_UP (spec §4.A, §6.1, §6.3). Pure and side-effect free
/// apart from the devices it asks `hw` to build, so it can be exercised in
/// tests without a running cloud client.
pub fn load(
    psem_json: &serde_json::Value,
    tsem_json: &serde_json::Value,
    hw: &mut dyn HardwareFactory,
) -> Result<LoadedConfig, ConfigError> {
    let mut psems = psem::parse_document(psem_json)?;
    let mut tsems_raw = tsem::parse_document(tsem_json)?;

    for entry in &psems {
        entry.validate()?;
    }
    for entry in &tsems_raw {
        entry.validate()?;
    }

    check_location_collisions(&psems, &tsems_raw)?;

    let mut gpio = GpioAllocator::new();
    for entry in &tsems_raw {
        gpio.claim(entry.gpio_red)?;
        gpio.claim(entry.gpio_yellow)?;
        gpio.claim(entry.gpio_green)?;
    }
    for entry in &psems {
        gpio.claim(entry.gpio_red)?;
        gpio.claim(entry.gpio_green)?;
        if let Some(button) = entry.gpio_button {
            gpio.claim(button)?;
        }
    }

    tsems_raw.sort_by_key(|e| e.location);
    psems.sort_by_key(|e| e.location);

    if psems.len() % 2 != 0 {
        return Err(ConfigError::CrosswalkPairing(psems.len()));
    }

    let mut max_location = 0;
    for entry in &tsems_raw {
        max_location = max_location.max(entry.location);
        for &dest in &entry.destinations {
            max_location = max_location.max(dest);
        }
    }
    for entry in &psems {
        max_location = max_location.max(entry.location);
    }

    let tsems = tsems_raw.into_iter().map(|entry| build_tsem(entry, hw)).collect();

    let mut crosswalks = Vec::with_capacity(psems.len() / 2);
    let mut psems = psems.into_iter();
    while let (Some(a), Some(b)) = (psems.next(), psems.next()) {
        let psem_a = build_psem(a, hw);
        let psem_b = build_psem(b, hw);
        crosswalks.push(Crosswalk::new(psem_a, psem_b));
    }

    Ok(ElementTables { tsems, crosswalks, max_location })
}

fn check_location_collisions(psems: &[PsemEntry], tsems: &[TsemEntry]) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for location in tsems.iter().map(|e| e.location).chain(psems.iter().map(|e| e.location)) {
        if !seen.insert(location) {
            return Err(ConfigError::LocationCollision(location));
        }
    }
    Ok(())
}

fn build_tsem(entry: TsemEntry, hw: &mut dyn HardwareFactory) -> TrafficSemaphore {
    TrafficSemaphore::new(
        entry.location,
        entry.destinations,
        hw.light_line(entry.gpio_red),
        hw.light_line(entry.gpio_yellow),
        hw.light_line(entry.gpio_green),
    )
}

fn build_psem(entry: PsemEntry, hw: &mut dyn HardwareFactory) -> PedestrianSemaphore {
    let button = entry.gpio_button.map(|gpio| hw.button(gpio));
    let buzzer = if entry.has_buzzer == 1 { Some(hw.buzzer(entry.gpio_red)) } else { None };
    let rfid = if entry.has_card_reader == 1 { Some(hw.rfid_reader(entry.gpio_red)) } else { None };
    PedestrianSemaphore::new(
        entry.location,
        hw.light_line(entry.gpio_red),
        hw.light_line(entry.gpio_green),
        button,
        buzzer,
        rfid,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::hardware::SimHardwareFactory;
    use serde_json::json;

    fn two_way_docs() -> (serde_json::Value, serde_json::Value) {
        let psems = json!([
            {"name": "PS1", "location": 1, "gpio_red": 1, "gpio_green": 2, "hasButton": 0, "hasCardReader": 0, "hasBuzzer": 0},
            {"name": "PS2", "location": 3, "gpio_red": 4, "gpio_green": 5, "hasButton": 0, "hasCardReader": 0, "hasBuzzer": 0},
        ]);
        let tsems = json!([
            {"name": "TS1", "location": 0, "destinations": [4], "gpio_red": 13, "gpio_green": 14, "gpio_yellow": 15},
            {"name": "TS2", "location": 4, "destinations": [0], "gpio_red": 16, "gpio_green": 17, "gpio_yellow": 18},
        ]);
        (psems, tsems)
    }

    #[test]
    fn loads_a_two_way_intersection() {
        let (psems, tsems) = two_way_docs();
        let mut hw = SimHardwareFactory::new();
        let loaded = load(&psems, &tsems, &mut hw).unwrap();
        assert_eq!(loaded.tsems.len(), 2);
        assert_eq!(loaded.crosswalks.len(), 1);
        assert_eq!(loaded.max_location, 4);
    }

    #[test]
    fn rejects_location_collisions_across_tables() {
        let (psems, mut tsems) = two_way_docs();
        tsems[0]["location"] = json!(1);
        let mut hw = SimHardwareFactory::new();
        assert!(matches!(
            load(&psems, &tsems, &mut hw),
            Err(ConfigError::LocationCollision(1))
        ));
    }

    #[test]
    fn rejects_gpio_collisions() {
        let (mut psems, tsems) = two_way_docs();
        psems[1]["gpio_red"] = json!(13);
        let mut hw = SimHardwareFactory::new();
        assert!(matches!(load(&psems, &tsems, &mut hw), Err(ConfigError::GpioCollision(13))));
    }

    #[test]
    fn rejects_odd_psem_count() {
        let (mut psems, tsems) = two_way_docs();
        psems.as_array_mut().unwrap().pop();
        let mut hw = SimHardwareFactory::new();
        assert!(matches!(load(&psems, &tsems, &mut hw), Err(ConfigError::CrosswalkPairing(1))));
    }
}
