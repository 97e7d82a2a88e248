use std::time::Duration;
use crate::enums::connection_status::ConnectionStatus;

/// Events published by the transport layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionEvent {
    StatusChanged {
        previous: ConnectionStatus,
        current: ConnectionStatus,
    },
    ReconnectScheduled {
        attempt: u32,
        delay: Duration,
    },
    ReconnectExhausted {
        attempts: u32,
    },
}
