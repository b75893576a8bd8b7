//! In-memory [`CloudClient`] used by tests exercising SET_UP and the RFID
//! validation round-trip without a running management service, following
//! the teacher's own test-fixture-module convention (`utils::test_grids`).
use std::sync::Mutex;

use crate::model::EmergencyContext;

use super::{CloudClient, CloudError};

/// Records every outbound call it receives and answers with whatever was
/// configured via the `with_*` builders. Unconfigured calls answer with a
/// sensible empty default rather than panicking, so tests only need to set
/// up the responses the scenario actually exercises.
#[derive(Default)]
pub struct MockCloudClient {
    psem_config: Mutex<Option<serde_json::Value>>,
    tsem_config: Mutex<Option<serde_json::Value>>,
    rfid_valid: Mutex<bool>,
    posted_emergencies: Mutex<Vec<EmergencyContext>>,
    posted_crossings: Mutex<Vec<(String, String)>>,
    fail_persistent: Mutex<bool>,
}

impl MockCloudClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_psem_config(self, json: serde_json::Value) -> Self {
        *self.psem_config.lock().unwrap() = Some(json);
        self
    }

    pub fn with_tsem_config(self, json: serde_json::Value) -> Self {
        *self.tsem_config.lock().unwrap() = Some(json);
        self
    }

    pub fn with_rfid_valid(self, valid: bool) -> Self {
        *self.rfid_valid.lock().unwrap() = valid;
        self
    }

    /// Every call fails with `CloudError::Persistent`, modeling a
    /// management service that is entirely unreachable (spec §7
    /// CloudTransientError's exhausted-retry outcome).
    pub fn failing(self) -> Self {
        *self.fail_persistent.lock().unwrap() = true;
        self
    }

    pub fn posted_emergencies(&self) -> Vec<EmergencyContext> {
        self.posted_emergencies.lock().unwrap().clone()
    }

    pub fn posted_crossings(&self) -> Vec<(String, String)> {
        self.posted_crossings.lock().unwrap().clone()
    }

    fn check_failing(&self) -> Result<(), CloudError> {
        if *self.fail_persistent.lock().unwrap() {
            Err(CloudError::Persistent("mock cloud client configured to fail".to_string()))
        } else {
            Ok(())
        }
    }
}

impl CloudClient for MockCloudClient {
    fn fetch_psem_config(&self) -> Result<serde_json::Value, CloudError> {
        self.check_failing()?;
        Ok(self.psem_config.lock().unwrap().clone().unwrap_or_else(|| serde_json::json!([])))
    }

    fn fetch_tsem_config(&self) -> Result<serde_json::Value, CloudError> {
        self.check_failing()?;
        Ok(self.tsem_config.lock().unwrap().clone().unwrap_or_else(|| serde_json::json!([])))
    }

    fn validate_rfid(&self, _location: i32, _uuid: u32) -> Result<bool, CloudError> {
        self.check_failing()?;
        Ok(*self.rfid_valid.lock().unwrap())
    }

    fn post_emergency(&self, _tmcid: &str, _controlbox_id: &str, ctx: &EmergencyContext) -> Result<(), CloudError> {
        self.check_failing()?;
        self.posted_emergencies.lock().unwrap().push(ctx.clone());
        Ok(())
    }

    fn post_pedestrian_crossing(&self, psem_id: &str, pedestrian_cc_id: &str) -> Result<(), CloudError> {
        self.check_failing()?;
        self.posted_crossings.lock().unwrap().push((psem_id.to_string(), pedestrian_cc_id.to_string()));
        Ok(())
    }

    fn query(&self, _table: &str, _field: &str, _value: &str) -> Result<serde_json::Value, CloudError> {
        self.check_failing()?;
        Ok(serde_json::json!({"found": false}))
    }

    fn patch(
        &self,
        _table: &str,
        _identifier_field: &str,
        _identifier_value: &str,
        _update_field: &str,
        _update_value: &str,
    ) -> Result<(), CloudError> {
        self.check_failing()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_posted_emergencies() {
        let mock = MockCloudClient::new();
        let ctx = EmergencyContext::new("XYZ-123", 5, 2, 9);
        mock.post_emergency("tmc-1", "box-1", &ctx).unwrap();
        assert_eq!(mock.posted_emergencies().len(), 1);
    }

    #[test]
    fn failing_client_returns_persistent_error() {
        let mock = MockCloudClient::new().failing();
        assert!(matches!(mock.validate_rfid(1, 2), Err(CloudError::Persistent(_))));
    }
}
