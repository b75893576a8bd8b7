use std::thread;
use std::time::Duration;

use crate::model::EmergencyContext;
use crate::verbose::EVENT_CLOUD_RETRY;

use super::types::{iso8601_utc_now, CloudError};

/// One method per cloud management endpoint (spec §6.1). Strategies are
/// the only callers; the mediator consumer never talks to the cloud
/// directly (spec §4.D "the consumer performs no I/O itself").
pub trait CloudClient: Send + Sync {
    fn fetch_psem_config(&self) -> Result<serde_json::Value, CloudError>;
    fn fetch_tsem_config(&self) -> Result<serde_json::Value, CloudError>;
    fn validate_rfid(&self, location: i32, uuid: u32) -> Result<bool, CloudError>;
    fn post_emergency(&self, tmcid: &str, controlbox_id: &str, ctx: &EmergencyContext) -> Result<(), CloudError>;
    fn post_pedestrian_crossing(&self, psem_id: &str, pedestrian_cc_id: &str) -> Result<(), CloudError>;
    fn query(&self, table: &str, field: &str, value: &str) -> Result<serde_json::Value, CloudError>;
    fn patch(
        &self,
        table: &str,
        identifier_field: &str,
        identifier_value: &str,
        update_field: &str,
        update_value: &str,
    ) -> Result<(), CloudError>;
}

/// Retries `op` up to 3 attempts with a fixed 5 s back-off on
/// [`CloudError::Transient`] (spec §7 CloudTransientError); the third
/// consecutive failure is turned into `CloudError::Persistent`.
pub fn with_retry<T>(mut op: impl FnMut() -> Result<T, CloudError>) -> Result<T, CloudError> {
    const MAX_ATTEMPTS: u32 = 3;
    const BACKOFF: Duration = Duration::from_secs(5);

    let mut attempt = 0;
    loop {
        match op() {
            Ok(value) => return Ok(value),
            Err(CloudError::Transient(detail)) => {
                attempt += 1;
                if attempt >= MAX_ATTEMPTS {
                    return Err(CloudError::Persistent(detail));
                }
                crate::log_main!(EVENT_CLOUD_RETRY, "retrying after transient cloud error", attempt = attempt);
                thread::sleep(BACKOFF);
            }
            Err(persistent @ CloudError::Persistent(_)) => return Err(persistent),
        }
    }
}

/// `ureq`-backed implementation of [`CloudClient`] (spec §6.1): blocking,
/// minimal-dependency HTTP client, matching the thread-based concurrency
/// model of §5 instead of pulling in an async runtime the core otherwise
/// has no use for.
pub struct HttpCloudClient {
    base_url: String,
    agent: ureq::Agent,
}

impl HttpCloudClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), agent: ureq::AgentBuilder::new().build() }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn classify(err: ureq::Error) -> CloudError {
        match err {
            ureq::Error::Status(code, response) => {
                let detail = response
                    .into_string()
                    .unwrap_or_else(|_| format!("HTTP {} with unreadable body", code));
                CloudError::Transient(format!("HTTP {}: {}", code, detail))
            }
            ureq::Error::Transport(transport) => CloudError::Transient(transport.to_string()),
        }
    }
}

impl CloudClient for HttpCloudClient {
    fn fetch_psem_config(&self) -> Result<serde_json::Value, CloudError> {
        with_retry(|| {
            self.agent
                .get(&self.url("/data/psem_configuration/table/correct"))
                .call()
                .map_err(Self::classify)
                .and_then(|resp| resp.into_json().map_err(|e| CloudError::Transient(e.to_string())))
        })
    }

    fn fetch_tsem_config(&self) -> Result<serde_json::Value, CloudError> {
        with_retry(|| {
            self.agent
                .get(&self.url("/data/tsem_configuration/table/correct"))
                .call()
                .map_err(Self::classify)
                .and_then(|resp| resp.into_json().map_err(|e| CloudError::Transient(e.to_string())))
        })
    }

    fn validate_rfid(&self, location: i32, uuid: u32) -> Result<bool, CloudError> {
        with_retry(|| {
            let body: serde_json::Value = self
                .agent
                .get(&self.url(&format!("/data/rfid_tag/tag_uuid/{}", uuid)))
                .call()
                .map_err(Self::classify)
                .and_then(|resp| resp.into_json().map_err(|e| CloudError::Transient(e.to_string())))?;
            let _ = location;
            Ok(body.get("found").and_then(|v| v.as_bool()).unwrap_or(false))
        })
    }

    fn post_emergency(&self, tmcid: &str, controlbox_id: &str, ctx: &EmergencyContext) -> Result<(), CloudError> {
        with_retry(|| {
            self.agent
                .post(&self.url("/data/emergencyvehicle"))
                .send_json(serde_json::json!({
                    "tmcid": tmcid,
                    "controlbox_id": controlbox_id,
                    "licenseplate": ctx.license_plate,
                    "origin": ctx.origin_location,
                    "destination": ctx.destination_location,
                    "priority_level": ctx.priority,
                    "timestamp": iso8601_utc_now(),
                }))
                .map(|_| ())
                .map_err(Self::classify)
        })
    }

    fn post_pedestrian_crossing(&self, psem_id: &str, pedestrian_cc_id: &str) -> Result<(), CloudError> {
        with_retry(|| {
            self.agent
                .post(&self.url("/data/p_semaphore_pedestrian"))
                .send_json(serde_json::json!({
                    "psem_id": psem_id,
                    "pedestrianCC_id": pedestrian_cc_id,
                    "timestamp": iso8601_utc_now(),
                }))
                .map(|_| ())
                .map_err(Self::classify)
        })
    }

    fn query(&self, table: &str, field: &str, value: &str) -> Result<serde_json::Value, CloudError> {
        with_retry(|| {
            self.agent
                .get(&self.url(&format!("/data/{}/{}/{}", table, field, value)))
                .call()
                .map_err(Self::classify)
                .and_then(|resp| resp.into_json().map_err(|e| CloudError::Transient(e.to_string())))
        })
    }

    fn patch(
        &self,
        table: &str,
        identifier_field: &str,
        identifier_value: &str,
        update_field: &str,
        update_value: &str,
    ) -> Result<(), CloudError> {
        with_retry(|| {
            self.agent
                .request("PATCH", &self.url(&format!("/data/{}", table)))
                .send_json(serde_json::json!({
                    "identifierField": identifier_field,
                    "identifierValue": identifier_value,
                    "updateField": update_field,
                    "updateValue": update_value,
                }))
                .map(|_| ())
                .map_err(Self::classify)
        })
    }
}
