use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::enums::approval_status::ApprovalStatus;
use crate::enums::change_type::ChangeType;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineHistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub change_type: ChangeType,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub status: Option<ApprovalStatus>,
}
