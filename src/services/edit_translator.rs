use crate::structs::content_change::ContentChange;
use crate::structs::line_change::LineChange;

pub struct EditTranslator;

impl EditTranslator {
    /// Splits a host edit into line-level changes: overlapping lines become
    /// modifications (when the text differs), surplus new lines additions and
    /// surplus old lines deletions.
    pub fn translate(change: &ContentChange) -> Vec<LineChange> {
        let start = change.start_line.max(1);
        let shared = change.old_lines.len().min(change.new_lines.len());
        let mut result = Vec::new();

        for offset in 0..shared {
            let old = &change.old_lines[offset];
            let new = &change.new_lines[offset];
            if old != new {
                result.push(LineChange::modified(start + offset, Some(old), new));
            }
        }

        for (offset, line) in change.new_lines.iter().enumerate().skip(shared) {
            result.push(LineChange::added(start + offset, line));
        }

        for (offset, line) in change.old_lines.iter().enumerate().skip(shared) {
            result.push(LineChange::deleted(start + offset, line));
        }

        result
    }

    pub fn translate_all(changes: &[ContentChange]) -> Vec<LineChange> {
        changes.iter().flat_map(Self::translate).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::change_type::ChangeType;

    #[test]
    fn in_place_edit_is_a_modification() {
        let changes = EditTranslator::translate(&ContentChange::new(3, &["let a = 1;"], &["let a = 2;"]));
        assert_eq!(changes, vec![LineChange::modified(3, Some("let a = 1;"), "let a = 2;")]);
    }

    #[test]
    fn pure_insertion_adds_each_line() {
        let changes = EditTranslator::translate(&ContentChange::new(10, &[], &["a", "b", "c"]));
        assert_eq!(changes.len(), 3);
        assert!(changes.iter().all(|c| c.change_type == ChangeType::Added && c.old_content.is_none()));
        assert_eq!(changes.iter().map(|c| c.line_number).collect::<Vec<_>>(), vec![10, 11, 12]);
    }

    #[test]
    fn removal_produces_deletions_with_old_content_only() {
        let changes = EditTranslator::translate(&ContentChange::new(5, &["x", "y"], &[]));
        assert_eq!(changes, vec![LineChange::deleted(5, "x"), LineChange::deleted(6, "y")]);
        assert!(changes.iter().all(|c| c.new_content.is_none()));
    }

    #[test]
    fn mixed_edit_splits_by_granularity() {
        let changes = EditTranslator::translate(&ContentChange::new(1, &["a", "b", "c"], &["a", "B"]));
        assert_eq!(
            changes,
            vec![LineChange::modified(2, Some("b"), "B"), LineChange::deleted(3, "c")]
        );
    }

    #[test]
    fn unchanged_lines_produce_nothing() {
        assert!(EditTranslator::translate(&ContentChange::new(1, &["same"], &["same"])).is_empty());
    }

    #[test]
    fn line_zero_is_clamped_to_first_line() {
        let changes = EditTranslator::translate(&ContentChange::new(0, &[], &["first"]));
        assert_eq!(changes[0].line_number, 1);
    }
}
