//! # Emergency pub/sub collaborator
//!
//! The DDS `EmergencyAlert` topic (spec §6.2) is out of scope for this core
//! (spec §1): the wire protocol, reliability QoS and transient-local history
//! are someone else's problem. What the core needs is a blocking source of
//! [`EmergencyBusEvent`]s — a match is a `Start`, an unmatch is a `Finish`
//! (spec §7 DDSMatchLost: "interpreted as EmergencyFinish, not an error").
use std::sync::mpsc::{Receiver, RecvError, Sender};

/// One emergency-bus occurrence, already reduced from the DDS match/unmatch
/// status events to the two things the core's EMERGENCY strategy cares
/// about.
#[derive(Debug, Clone)]
pub enum EmergencyBusEvent {
    Start { plate: String, origin: i32, destination: i32, priority: u8 },
    Finish,
}

/// A blocking source of emergency-bus occurrences. The real implementation
/// wraps whatever DDS crate a deployment supplies; this crate only
/// specifies the boundary.
pub trait EmergencyBus: Send {
    fn recv(&self) -> Result<EmergencyBusEvent, RecvError>;
}

/// Channel-backed reference implementation, named after the DDS
/// match/unmatch status-event shape it stands in for. Used by tests, and by
/// `controlbox` when wired to a real DDS participant that forwards samples
/// onto the channel from its own subscriber thread.
pub struct ChannelEmergencyBus {
    rx: Receiver<EmergencyBusEvent>,
}

impl ChannelEmergencyBus {
    pub fn new() -> (Sender<EmergencyBusEvent>, Self) {
        let (tx, rx) = std::sync::mpsc::channel();
        (tx, Self { rx })
    }
}

impl EmergencyBus for ChannelEmergencyBus {
    fn recv(&self) -> Result<EmergencyBusEvent, RecvError> {
        self.rx.recv()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forwards_start_and_finish_in_order() {
        let (tx, bus) = ChannelEmergencyBus::new();
        tx.send(EmergencyBusEvent::Start { plate: "ABC-1".into(), origin: 0, destination: 4, priority: 1 }).unwrap();
        tx.send(EmergencyBusEvent::Finish).unwrap();

        assert!(matches!(bus.recv().unwrap(), EmergencyBusEvent::Start { .. }));
        assert!(matches!(bus.recv().unwrap(), EmergencyBusEvent::Finish));
    }
}
