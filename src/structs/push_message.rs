use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::enums::push_message_type::PushMessageType;

/// Frame exchanged over the push channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushMessage {
    #[serde(rename = "type")]
    pub message_type: PushMessageType,
    #[serde(default)]
    pub payload: serde_json::Value,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl PushMessage {
    pub fn new(message_type: PushMessageType, payload: serde_json::Value) -> Self {
        Self {
            message_type,
            payload,
            timestamp: Utc::now(),
        }
    }

    pub fn heartbeat() -> Self {
        Self::new(PushMessageType::Heartbeat, serde_json::json!({ "ping": true }))
    }

    pub fn heartbeat_reply() -> Self {
        Self::new(PushMessageType::Heartbeat, serde_json::json!({ "pong": true }))
    }
}
