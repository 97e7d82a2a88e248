use crate::enums::approval_status::ApprovalStatus;
use crate::structs::approval_request::ApprovalRequest;

/// View-refresh signals from the approval queue.
#[derive(Debug, Clone, PartialEq)]
pub enum QueueEvent {
    Refreshed {
        pending: usize,
    },
    Upserted {
        request: ApprovalRequest,
        is_new: bool,
    },
    Resolved {
        request_id: String,
        status: ApprovalStatus,
    },
    Cleared,
}
