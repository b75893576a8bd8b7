//! NORMAL (spec §4.E): cycles phases on `LIGHTS_TIMEOUT`, grants pedestrian
//! extensions, forwards RFID scans to the cloud for validation, and defers
//! to EMERGENCY the instant an emergency vehicle is announced.
use crate::cloud::{CloudError, CloudRequest};
use crate::error::ControlError;
use crate::hal::HardwareWriteError;
use crate::model::{CloudResponse, EmergencyContext, Event, InternalEvent};

use super::{ControllerContext, Strategy, SystemState};

pub struct NormalStrategy;

impl Strategy for NormalStrategy {
    fn handle(&mut self, ctx: &mut ControllerContext, event: Event) -> Option<SystemState> {
        match event {
            Event::Internal(InternalEvent::NewStateEntered) => None,

            Event::Internal(InternalEvent::LightsTimeout) => {
                ctx.advance_to_next_phase();
                None
            }

            Event::Internal(InternalEvent::YellowTimeout) => None,

            Event::PedestrianButton { location } => {
                ctx.try_extend_for_pedestrian(location);
                None
            }

            Event::PedestrianRfid { location, uuid } => {
                let _ = ctx.cloud_tx.send(CloudRequest::ValidateRfid { location, uuid });
                None
            }

            Event::Cloud(CloudResponse::RfidValidation { valid: true, location }) => {
                ctx.try_extend_for_rfid(location);
                None
            }
            Event::Cloud(CloudResponse::RfidValidation { valid: false, .. }) => None,
            Event::Cloud(_) => None,

            Event::EmergencyStart { plate, location, direction, priority } => {
                ctx.emergency_queue.push_back(EmergencyContext::new(plate, location, direction, priority));
                Some(SystemState::Emergency)
            }

            // An EmergencyFinish with no matching start is a protocol
            // anomaly upstream of this crate; ignored rather than panicking.
            Event::EmergencyFinish => None,

            Event::Internal(InternalEvent::HardwareFault { line }) => {
                ctx.fatal_error = Some(ControlError::Hardware(HardwareWriteError {
                    line,
                    detail: "second consecutive write failure".to_string(),
                }));
                Some(SystemState::Failure)
            }

            Event::Internal(InternalEvent::CloudFault { detail }) => {
                ctx.fatal_error = Some(ControlError::Cloud(CloudError::Persistent(detail)));
                Some(SystemState::Failure)
            }

            Event::Shutdown => None,
        }
    }
}
