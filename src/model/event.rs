/// Internally generated relevant events (spec §3 Event / InternalEvent).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InternalEvent {
    NewStateEntered,
    YellowTimeout,
    LightsTimeout,
    /// A second consecutive write failure on the same GPIO line (spec §7
    /// HardwareWriteError escalation): the owning strategy turns this into a
    /// FAILURE transition.
    HardwareFault { line: u32 },
    /// The third consecutive retry of a cloud call exhausted (spec §7
    /// CloudTransientError → `CloudError::Persistent`): the owning strategy
    /// turns this into a FAILURE transition.
    CloudFault { detail: String },
}

/// A response to an outbound cloud request (spec §3 Event / CloudResponse,
/// §6.1).
#[derive(Debug, Clone)]
pub enum CloudResponse {
    PsemConfig(serde_json::Value),
    TsemConfig(serde_json::Value),
    RfidValidation { valid: bool, location: i32 },
}

/// The single tagged union every external stimulus is serialized into
/// before reaching the mediator queue (spec §3 Event, §9 "model Event as a
/// tagged sum").
#[derive(Debug, Clone)]
pub enum Event {
    Internal(InternalEvent),
    PedestrianButton { location: i32 },
    PedestrianRfid { location: i32, uuid: u32 },
    EmergencyStart { plate: String, location: i32, direction: i32, priority: u8 },
    EmergencyFinish,
    Cloud(CloudResponse),
    /// Fast-path request for the mediator consumer to stop draining even if
    /// producers are still alive (spec §5 "supports a shutdown signal that
    /// wakes all consumers").
    Shutdown,
}
