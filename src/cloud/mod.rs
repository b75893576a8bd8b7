//! # Cloud management client
//!
//! The HTTP collaborator out of scope per spec §1, reduced to the narrow
//! [`CloudClient`] trait the core actually consumes (spec §6.1, SPEC_FULL.md
//! §7.1). [`client::HttpCloudClient`] is the production implementation;
//! [`mock::MockCloudClient`] backs SET_UP and RFID-flow unit tests without a
//! running management service.
pub mod client;
pub mod mock;
pub mod types;
pub mod worker;

pub use client::{with_retry, CloudClient, HttpCloudClient};
pub use types::{iso8601_utc_now, CloudError};
pub use worker::{spawn_cloud_worker, CloudRequest};
