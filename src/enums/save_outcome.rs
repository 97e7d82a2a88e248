use crate::enums::priority::Priority;

/// What a save event did to a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    NotTracked,
    Paused,
    NothingBuffered,
    AlreadyPending {
        request_id: Option<String>,
    },
    AutoApproved {
        change_count: usize,
    },
    Submitted {
        request_id: String,
        priority: Priority,
    },
}
