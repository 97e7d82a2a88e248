use serde::{Deserialize, Serialize};
use crate::enums::priority::Priority;
use crate::structs::file_change::FileChange;

/// Body of `POST /approvals`: an approval request before the Engine assigns an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewApprovalRequest {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub changes: Vec<FileChange>,
    pub workflow_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u64>,
}
