use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::enums::session_status::SessionStatus;
use crate::structs::line_change::LineChange;
use crate::structs::mutation_analysis::MutationAnalysis;

/// Client-side tracking state for one file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowSession {
    pub id: String,
    pub file_path: String,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
    pub changes: Vec<LineChange>,
    pub pending_approval: bool,
    pub pending_approval_id: Option<String>,
    /// Prefix of `changes` covered by the outstanding request.
    pub submitted_change_count: usize,
    pub analysis: Option<MutationAnalysis>,
}

impl WorkflowSession {
    pub fn new(id: String, file_path: String, analysis: Option<MutationAnalysis>) -> Self {
        Self {
            id,
            file_path,
            status: SessionStatus::Active,
            created_at: Utc::now(),
            changes: Vec::new(),
            pending_approval: false,
            pending_approval_id: None,
            submitted_change_count: 0,
            analysis,
        }
    }

    /// Drops the first `count` buffered changes, keeping anything appended later.
    pub fn flush(&mut self, count: usize) {
        let count = count.min(self.changes.len());
        self.changes.drain(..count);
    }

    pub fn clear_pending(&mut self) {
        self.pending_approval = false;
        self.pending_approval_id = None;
        self.submitted_change_count = 0;
    }
}
