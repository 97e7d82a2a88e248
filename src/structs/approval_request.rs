use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::enums::approval_status::ApprovalStatus;
use crate::enums::priority::Priority;
use crate::structs::file_change::FileChange;

/// A server-tracked batch of changes awaiting a human decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalRequest {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: Priority,
    pub status: ApprovalStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub changes: Vec<FileChange>,
    /// Back-reference only; the queue never owns the session.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_id: Option<String>,
}

impl ApprovalRequest {
    pub fn is_pending(&self) -> bool {
        self.status == ApprovalStatus::Pending
    }

    pub fn file_paths(&self) -> Vec<String> {
        self.changes.iter().map(|c| c.file_path.clone()).collect()
    }

    pub fn line_change_count(&self) -> usize {
        self.changes.iter().map(|c| c.line_changes.len()).sum()
    }
}
