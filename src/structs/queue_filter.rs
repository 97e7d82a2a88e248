use crate::enums::priority::Priority;
use crate::structs::approval_request::ApprovalRequest;

/// Client-side view filter over the pending set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueueFilter {
    pub priority: Option<Priority>,
    pub text: Option<String>,
}

impl QueueFilter {
    pub fn is_empty(&self) -> bool {
        self.priority.is_none() && self.text.as_deref().map_or(true, str::is_empty)
    }

    pub fn matches(&self, request: &ApprovalRequest) -> bool {
        if let Some(priority) = self.priority {
            if request.priority != priority {
                return false;
            }
        }
        if let Some(text) = self.text.as_deref().filter(|t| !t.is_empty()) {
            let needle = text.to_lowercase();
            let in_title = request.title.to_lowercase().contains(&needle);
            let in_description = request.description.to_lowercase().contains(&needle);
            let in_files = request.changes.iter().any(|c| c.file_path.to_lowercase().contains(&needle));
            return in_title || in_description || in_files;
        }
        true
    }
}
