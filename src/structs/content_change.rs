use serde::{Deserialize, Serialize};

/// A host edit event for one contiguous block of lines: `old_lines` starting
/// at `start_line` (1-based) were replaced by `new_lines`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentChange {
    pub start_line: usize,
    pub old_lines: Vec<String>,
    pub new_lines: Vec<String>,
}

impl ContentChange {
    pub fn new(start_line: usize, old_lines: &[&str], new_lines: &[&str]) -> Self {
        Self {
            start_line,
            old_lines: old_lines.iter().map(ToString::to_string).collect(),
            new_lines: new_lines.iter().map(ToString::to_string).collect(),
        }
    }
}
