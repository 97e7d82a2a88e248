use crate::enums::priority::Priority;
use crate::structs::approval_request::ApprovalRequest;
use crate::structs::line_change::LineChange;

/// Events published by the workflow session store.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowEvent {
    SessionStarted {
        workflow_id: String,
        file_path: String,
    },
    SessionPaused {
        workflow_id: String,
        file_path: String,
    },
    SessionResumed {
        workflow_id: String,
        file_path: String,
    },
    SessionStopped {
        workflow_id: String,
        file_path: String,
    },
    SessionCompleted {
        workflow_id: String,
        file_path: String,
    },
    AutoApproved {
        workflow_id: String,
        file_path: String,
        changes: Vec<LineChange>,
    },
    ApprovalRequested {
        workflow_id: String,
        file_path: String,
        priority: Priority,
        request: ApprovalRequest,
    },
    ApprovalGranted {
        workflow_id: String,
        file_path: String,
        request_id: String,
        changes: Vec<LineChange>,
    },
    ApprovalRejected {
        workflow_id: String,
        file_path: String,
        request_id: String,
        changes: Vec<LineChange>,
    },
    ApprovalExpired {
        workflow_id: String,
        file_path: String,
        request_id: String,
    },
    ApprovalCancelled {
        workflow_id: String,
        file_path: String,
        request_id: String,
    },
    SubmissionFailed {
        workflow_id: String,
        file_path: String,
        message: String,
    },
}

impl WorkflowEvent {
    pub fn file_path(&self) -> &str {
        match self {
            WorkflowEvent::SessionStarted { file_path, .. }
            | WorkflowEvent::SessionPaused { file_path, .. }
            | WorkflowEvent::SessionResumed { file_path, .. }
            | WorkflowEvent::SessionStopped { file_path, .. }
            | WorkflowEvent::SessionCompleted { file_path, .. }
            | WorkflowEvent::AutoApproved { file_path, .. }
            | WorkflowEvent::ApprovalRequested { file_path, .. }
            | WorkflowEvent::ApprovalGranted { file_path, .. }
            | WorkflowEvent::ApprovalRejected { file_path, .. }
            | WorkflowEvent::ApprovalExpired { file_path, .. }
            | WorkflowEvent::ApprovalCancelled { file_path, .. }
            | WorkflowEvent::SubmissionFailed { file_path, .. } => file_path,
        }
    }
}
