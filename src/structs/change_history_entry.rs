use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::enums::approval_status::ApprovalStatus;
use crate::enums::priority::Priority;

/// Terminal record of a resolved approval request, as served by the Engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeHistoryEntry {
    pub id: String,
    #[serde(default)]
    pub request_id: String,
    pub title: String,
    pub status: ApprovalStatus,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub file_paths: Vec<String>,
    #[serde(default)]
    pub change_count: usize,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub decided_by: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

impl ChangeHistoryEntry {
    /// Completion time, falling back to creation time.
    pub fn effective_time(&self) -> DateTime<Utc> {
        self.completed_at.unwrap_or(self.created_at)
    }
}
