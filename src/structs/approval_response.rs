use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::enums::approval_status::ApprovalStatus;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalResponse {
    pub request_id: String,
    pub status: ApprovalStatus,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub decided_at: Option<DateTime<Utc>>,
}
