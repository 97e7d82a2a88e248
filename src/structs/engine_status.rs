use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineStatus {
    pub version: String,
    pub status: String,
    #[serde(default)]
    pub uptime: u64,
    #[serde(default)]
    pub active_connections: u32,
    #[serde(default)]
    pub pending_approvals: u32,
}

impl EngineStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self.status.as_str(), "healthy" | "ok" | "up")
    }
}
