use indexmap::IndexSet;

use crate::config::ConfigError;

/// Allow-listed GPIO line offsets (spec §6.4): `{1..=7, 13..=27}`.
pub fn is_allowed(line: u32) -> bool {
    (1..=7).contains(&line) || (13..=27).contains(&line)
}

/// Tracks claimed GPIO lines during SET_UP. Allocation order follows
/// document order, matching the original's "first claim wins" semantics;
/// `IndexSet` gives us O(1) collision checks and a stable iteration order
/// for diagnostics.
#[derive(Default)]
pub struct GpioAllocator {
    claimed: IndexSet<u32>,
}

impl GpioAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `line`, failing if it is outside the allow-list or already
    /// claimed by another semaphore (spec §4.A GpioCollision).
    pub fn claim(&mut self, line: u32) -> Result<(), ConfigError> {
        if !is_allowed(line) || !self.claimed.insert(line) {
            return Err(ConfigError::GpioCollision(line));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allow_list_matches_spec_ranges() {
        for line in 1..=7 {
            assert!(is_allowed(line));
        }
        for line in 13..=27 {
            assert!(is_allowed(line));
        }
        assert!(!is_allowed(0));
        assert!(!is_allowed(8));
        assert!(!is_allowed(12));
        assert!(!is_allowed(28));
    }

    #[test]
    fn allocator_rejects_duplicate_claims() {
        let mut alloc = GpioAllocator::new();
        alloc.claim(3).unwrap();
        assert!(matches!(alloc.claim(3), Err(ConfigError::GpioCollision(3))));
    }

    #[test]
    fn allocator_rejects_out_of_range_lines() {
        let mut alloc = GpioAllocator::new();
        assert!(matches!(alloc.claim(9), Err(ConfigError::GpioCollision(9))));
    }
}
