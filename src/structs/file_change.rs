use serde::{Deserialize, Serialize};
use crate::enums::change_type::ChangeType;
use crate::structs::line_change::LineChange;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileChange {
    pub file_path: String,
    pub change_type: ChangeType,
    #[serde(default)]
    pub line_changes: Vec<LineChange>,
}

impl FileChange {
    pub fn modified(file_path: &str, line_changes: Vec<LineChange>) -> Self {
        Self {
            file_path: file_path.to_string(),
            change_type: ChangeType::Modified,
            line_changes,
        }
    }
}
