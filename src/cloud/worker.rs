//! The cloud worker thread (spec §2 data flow: "Cloud-bound status updates
//! and emergency audit records are emitted through a second outbound queue
//! consumed by the cloud worker"). Strategies never block on a [`CloudClient`]
//! call themselves; they enqueue a [`CloudRequest`] and keep draining the
//! mediator's event queue, and the worker reports back onto that same queue
//! via [`Event::Cloud`] / [`InternalEvent::CloudFault`] (spec §4.D "the
//! consumer performs no I/O itself").
use std::sync::mpsc::{self, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::model::{CloudResponse, EmergencyContext, Event, InternalEvent};

use super::{CloudClient, CloudError};

/// One outbound cloud call, queued by a strategy and drained by the worker
/// thread (lowest real-time priority per spec §5).
pub enum CloudRequest {
    Configure,
    ValidateRfid { location: i32, uuid: u32 },
    EmergencyRecord(EmergencyContext),
    PedestrianCrossing { psem_id: String, pedestrian_cc_id: String },
}

/// Spawns the cloud worker thread and returns the submission channel plus
/// its join handle. `tmcid`/`controlbox_id` are baked in at spawn time since
/// every `post_emergency` call needs both (spec §6.1).
pub fn spawn_cloud_worker(
    client: Arc<dyn CloudClient>,
    event_tx: Sender<Event>,
    tmcid: String,
    controlbox_id: String,
) -> (Sender<CloudRequest>, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel::<CloudRequest>();

    let handle = thread::Builder::new()
        .name("cloud-worker".to_string())
        .spawn(move || {
            for request in rx.iter() {
                match request {
                    CloudRequest::Configure => {
                        match client.fetch_psem_config() {
                            Ok(json) => {
                                let _ = event_tx.send(Event::Cloud(CloudResponse::PsemConfig(json)));
                            }
                            Err(err) => send_fault(&event_tx, err),
                        }
                        match client.fetch_tsem_config() {
                            Ok(json) => {
                                let _ = event_tx.send(Event::Cloud(CloudResponse::TsemConfig(json)));
                            }
                            Err(err) => send_fault(&event_tx, err),
                        }
                    }
                    CloudRequest::ValidateRfid { location, uuid } => match client.validate_rfid(location, uuid) {
                        Ok(valid) => {
                            let _ = event_tx.send(Event::Cloud(CloudResponse::RfidValidation { valid, location }));
                        }
                        Err(err) => send_fault(&event_tx, err),
                    },
                    CloudRequest::EmergencyRecord(ctx) => {
                        if let Err(err) = client.post_emergency(&tmcid, &controlbox_id, &ctx) {
                            send_fault(&event_tx, err);
                        }
                    }
                    CloudRequest::PedestrianCrossing { psem_id, pedestrian_cc_id } => {
                        if let Err(err) = client.post_pedestrian_crossing(&psem_id, &pedestrian_cc_id) {
                            send_fault(&event_tx, err);
                        }
                    }
                }
            }
        })
        .expect("failed to spawn cloud worker thread");

    (tx, handle)
}

/// Only `CloudError::Persistent` ever reaches here: every `CloudClient`
/// method already retries transient failures internally via
/// [`super::with_retry`] (spec §7 CloudTransientError).
fn send_fault(event_tx: &Sender<Event>, err: CloudError) {
    let detail = match err {
        CloudError::Transient(detail) | CloudError::Persistent(detail) => detail,
    };
    let _ = event_tx.send(Event::Internal(InternalEvent::CloudFault { detail }));
}
