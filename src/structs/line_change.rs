use serde::{Deserialize, Serialize};
use crate::enums::change_type::ChangeType;

/// One line-level edit, 1-based.
///
/// Deleted lines carry only `old_content`, added lines only `new_content`;
/// modified lines carry `new_content` and usually `old_content`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineChange {
    pub line_number: usize,
    pub change_type: ChangeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_content: Option<String>,
}

impl LineChange {
    pub fn added(line_number: usize, new_content: &str) -> Self {
        Self {
            line_number,
            change_type: ChangeType::Added,
            old_content: None,
            new_content: Some(new_content.to_string()),
        }
    }

    pub fn modified(line_number: usize, old_content: Option<&str>, new_content: &str) -> Self {
        Self {
            line_number,
            change_type: ChangeType::Modified,
            old_content: old_content.map(ToString::to_string),
            new_content: Some(new_content.to_string()),
        }
    }

    pub fn deleted(line_number: usize, old_content: &str) -> Self {
        Self {
            line_number,
            change_type: ChangeType::Deleted,
            old_content: Some(old_content.to_string()),
            new_content: None,
        }
    }

    pub fn is_deletion(&self) -> bool {
        self.change_type == ChangeType::Deleted
    }

    /// Content introduced by this change, if any.
    pub fn introduced_content(&self) -> Option<&str> {
        match self.change_type {
            ChangeType::Added | ChangeType::Modified => self.new_content.as_deref(),
            ChangeType::Deleted => None,
        }
    }
}
