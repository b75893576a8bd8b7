use crate::model::DEFAULT_SWITCHING_TIME;

/// A maximal set of non-conflicting intersection elements that may show
/// green simultaneously (spec §3 Phase / Configuration). Cheap value copy
/// of location sets plus a mutable `time`; elements are referenced
/// non-owningly by integer location, resolved through the controller's
/// element tables (spec §3 Ownership / Back-references without cycles).
#[derive(Debug, Clone)]
pub struct Phase {
    /// Locations of the `TrafficSemaphore`s active (green) in this phase.
    tsem_locations: Vec<i32>,
    /// Locations of the pedestrian semaphores active (green) in this
    /// phase, one `(min, max)` pair per crosswalk.
    crosswalk_spans: Vec<(i32, i32)>,
    /// Nominal green duration in seconds for the *next* activation of this
    /// phase. Reset to [`DEFAULT_SWITCHING_TIME`] on every phase exit
    /// (spec §3 Lifecycles).
    time: u32,
}

impl Phase {
    pub fn new(tsem_locations: Vec<i32>, crosswalk_spans: Vec<(i32, i32)>) -> Self {
        Self { tsem_locations, crosswalk_spans, time: DEFAULT_SWITCHING_TIME }
    }

    pub fn tsem_locations(&self) -> &[i32] {
        &self.tsem_locations
    }

    pub fn crosswalk_spans(&self) -> &[(i32, i32)] {
        &self.crosswalk_spans
    }

    pub fn time(&self) -> u32 {
        self.time
    }

    pub fn contains_tsem(&self, location: i32) -> bool {
        self.tsem_locations.contains(&location)
    }

    pub fn contains_crosswalk(&self, span: (i32, i32)) -> bool {
        self.crosswalk_spans.contains(&span)
    }

    /// Shortens the remaining green by [`crate::model::REDUCE_SECONDS`],
    /// never below [`crate::model::MIN_SECONDS`] (spec §4.C pedestrian
    /// extension). Returns `true` if the reduction was applied.
    pub fn extend_for_pedestrian(&mut self, remaining: u32) -> Option<u32> {
        use crate::model::{MIN_SECONDS, REDUCE_SECONDS};
        if remaining > MIN_SECONDS {
            Some(remaining - REDUCE_SECONDS)
        } else {
            None
        }
    }

    /// Doubles the phase's nominal time for the next activation, capped at
    /// 2x the default, but only if it has not already been extended (spec
    /// §4.C RFID-recognized shortening, and the asymmetric-cap Open
    /// Question resolved in SPEC_FULL.md §12.2: a phase whose time was
    /// already bumped above default is not extended again).
    pub fn extend_for_rfid(&mut self) -> bool {
        if self.time <= DEFAULT_SWITCHING_TIME {
            self.time = (self.time + DEFAULT_SWITCHING_TIME).min(DEFAULT_SWITCHING_TIME * 2);
            true
        } else {
            false
        }
    }

    /// Resets `time` back to the default. Called by the scheduler worker
    /// on phase exit (spec §3 Lifecycles).
    pub fn reset_time(&mut self) {
        self.time = DEFAULT_SWITCHING_TIME;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rfid_extension_caps_at_double_default() {
        let mut phase = Phase::new(vec![0], vec![]);
        assert!(phase.extend_for_rfid());
        assert_eq!(phase.time(), DEFAULT_SWITCHING_TIME * 2);
        // Already at the cap: a second RFID hit before the phase activates
        // again must not extend it further.
        assert!(!phase.extend_for_rfid());
        assert_eq!(phase.time(), DEFAULT_SWITCHING_TIME * 2);
    }

    #[test]
    fn pedestrian_extension_respects_floor() {
        let mut phase = Phase::new(vec![0], vec![(1, 3)]);
        // Scenario 2: remaining == default (5s) — no extension, floor is 10s.
        assert_eq!(phase.extend_for_pedestrian(5), None);
        // Scenario 3: plenty of headroom.
        phase.time = 20;
        assert_eq!(phase.extend_for_pedestrian(18), Some(13));
    }

    #[test]
    fn reset_time_restores_default() {
        let mut phase = Phase::new(vec![0], vec![]);
        phase.extend_for_rfid();
        phase.reset_time();
        assert_eq!(phase.time(), DEFAULT_SWITCHING_TIME);
    }
}
