use serde::{Deserialize, Serialize};
use crate::structs::line_change::LineChange;

/// Inclusive 1-based line range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineRange {
    pub start: usize,
    pub end: usize,
}

impl LineRange {
    pub fn new(start: usize, end: usize) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self { start: end, end: start }
        }
    }

    pub fn single(line: usize) -> Self {
        Self { start: line, end: line }
    }

    pub fn lines(&self) -> impl Iterator<Item = usize> {
        self.start..=self.end
    }
}

impl From<&LineChange> for LineRange {
    fn from(change: &LineChange) -> Self {
        LineRange::single(change.line_number)
    }
}
