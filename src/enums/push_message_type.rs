use serde::{Deserialize, Serialize};

/// Discriminator of a push-channel message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PushMessageType {
    Heartbeat,
    ApprovalRequest,
    ApprovalUpdate,
    ApprovalCompleted,
    ChangeHistoryUpdate,
    WorkflowUpdate,
    EngineStatus,
    #[serde(other)]
    Unknown,
}
