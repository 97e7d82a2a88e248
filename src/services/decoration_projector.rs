use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use dashmap::DashMap;
use crate::enums::decoration_status::DecorationStatus;
use crate::enums::workflow_event::WorkflowEvent;
use crate::structs::line_change::LineChange;
use crate::structs::line_decoration::LineDecoration;
use crate::structs::line_range::LineRange;
use crate::structs::validation_report::{IssueSeverity, ValidationReport};
use crate::traits::editor_surface::EditorSurface;

/// A status painted over a line range, with optional extra hover text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub status: DecorationStatus,
    pub range: LineRange,
    pub detail: Option<String>,
}

impl Annotation {
    pub fn new(status: DecorationStatus, range: LineRange) -> Self {
        Self { status, range, detail: None }
    }

    pub fn with_detail(mut self, detail: &str) -> Self {
        self.detail = Some(detail.to_string());
        self
    }
}

#[derive(Debug, Clone, Default)]
struct FileAnnotations {
    approval: Vec<Annotation>,
    validation: Vec<Annotation>,
}

impl FileAnnotations {
    fn is_empty(&self) -> bool {
        self.approval.is_empty() && self.validation.is_empty()
    }

    fn all(&self) -> impl Iterator<Item = &Annotation> {
        self.approval.iter().chain(self.validation.iter())
    }
}

/// Keeps the last known annotation state per file and renders it onto the
/// editor surface. Rendering always starts from stored state, so calling it
/// twice gives the same result.
pub struct DecorationProjector {
    surface: Arc<dyn EditorSurface>,
    show_inline: AtomicBool,
    files: DashMap<String, FileAnnotations>,
}

impl DecorationProjector {
    pub fn new(surface: Arc<dyn EditorSurface>, show_inline: bool) -> Self {
        Self {
            surface,
            show_inline: AtomicBool::new(show_inline),
            files: DashMap::new(),
        }
    }

    /// Replaces the approval-state layer of `file_path`.
    pub fn set_status(&self, file_path: &str, status: DecorationStatus, ranges: &[LineRange]) {
        let annotations = ranges.iter().map(|range| Annotation::new(status, *range)).collect();
        self.set_approval_layer(file_path, annotations);
    }

    pub fn mark_changes(&self, file_path: &str, status: DecorationStatus, changes: &[LineChange]) {
        let ranges: Vec<LineRange> = changes.iter().map(LineRange::from).collect();
        self.set_status(file_path, status, &ranges);
    }

    /// Replaces the validation layer with the issues in `report`.
    pub fn apply_validation(&self, report: &ValidationReport) {
        let annotations = report
            .issues
            .iter()
            .map(|issue| {
                let status = match issue.severity {
                    IssueSeverity::Error => DecorationStatus::ValidationError,
                    IssueSeverity::Warning => DecorationStatus::ValidationWarning,
                };
                let range = LineRange::new(issue.line.max(1), issue.end_line.unwrap_or(issue.line).max(1));
                Annotation::new(status, range).with_detail(&issue.message)
            })
            .collect();
        self.files.entry(report.file_path.clone()).or_default().validation = annotations;
        self.render(&report.file_path);
    }

    /// Removes every annotation of `file_path`.
    pub fn clear(&self, file_path: &str) {
        self.files.remove(file_path);
        self.surface.clear_annotations(file_path);
    }

    pub fn clear_all(&self) {
        let files: Vec<String> = self.files.iter().map(|entry| entry.key().clone()).collect();
        for file in files {
            self.clear(&file);
        }
    }

    /// Re-applies stored state when the editor shows `file_path` again.
    pub fn on_visible(&self, file_path: &str) {
        if self.files.contains_key(file_path) {
            self.render(file_path);
        }
    }

    pub fn on_config_changed(&self, show_inline: bool) {
        self.show_inline.store(show_inline, Ordering::SeqCst);
        for file in self.files() {
            self.render(&file);
        }
    }

    pub fn files(&self) -> Vec<String> {
        let mut files: Vec<String> = self.files.iter().map(|entry| entry.key().clone()).collect();
        files.sort();
        files
    }

    pub fn decorations(&self, file_path: &str) -> Vec<LineDecoration> {
        let show_inline = self.show_inline.load(Ordering::SeqCst);
        self.files
            .get(file_path)
            .map(|state| project(state.all(), show_inline))
            .unwrap_or_default()
    }

    /// Maps a workflow event onto the approval layer of its file.
    pub fn on_workflow_event(&self, event: &WorkflowEvent) {
        match event {
            WorkflowEvent::ApprovalRequested { file_path, request, .. } => {
                let changes: Vec<LineChange> = request
                    .changes
                    .iter()
                    .filter(|change| change.file_path == *file_path)
                    .flat_map(|change| change.line_changes.iter().cloned())
                    .collect();
                self.mark_changes(file_path, DecorationStatus::Pending, &changes);
            }
            WorkflowEvent::ApprovalGranted { file_path, changes, .. } => {
                self.mark_changes(file_path, DecorationStatus::Approved, changes);
            }
            WorkflowEvent::ApprovalRejected { file_path, changes, .. } => {
                self.mark_changes(file_path, DecorationStatus::Rejected, changes);
            }
            WorkflowEvent::AutoApproved { file_path, changes, .. } => {
                self.mark_changes(file_path, DecorationStatus::AutoApproved, changes);
            }
            WorkflowEvent::ApprovalExpired { file_path, .. } | WorkflowEvent::ApprovalCancelled { file_path, .. } => {
                self.set_approval_layer(file_path, Vec::new());
            }
            WorkflowEvent::SessionStopped { file_path, .. } | WorkflowEvent::SessionCompleted { file_path, .. } => {
                self.clear(file_path);
            }
            WorkflowEvent::SessionStarted { .. }
            | WorkflowEvent::SessionPaused { .. }
            | WorkflowEvent::SessionResumed { .. }
            | WorkflowEvent::SubmissionFailed { .. } => {}
        }
    }

    fn set_approval_layer(&self, file_path: &str, annotations: Vec<Annotation>) {
        let now_empty = {
            let mut state = self.files.entry(file_path.to_string()).or_default();
            state.approval = annotations;
            state.is_empty()
        };
        if now_empty {
            self.clear(file_path);
        } else {
            self.render(file_path);
        }
    }

    fn render(&self, file_path: &str) {
        let decorations = self.decorations(file_path);
        if decorations.is_empty() {
            self.surface.clear_annotations(file_path);
        } else {
            self.surface.apply_annotations(file_path, &decorations);
        }
    }
}

/// Which status wins when two annotations cover the same line.
fn precedence(status: DecorationStatus) -> u8 {
    match status {
        DecorationStatus::ValidationError => 6,
        DecorationStatus::Conflict => 5,
        DecorationStatus::Rejected => 4,
        DecorationStatus::ValidationWarning => 3,
        DecorationStatus::Pending => 2,
        DecorationStatus::AutoApproved => 1,
        DecorationStatus::Approved => 0,
    }
}

/// Per-line descriptors for `annotations`, one per line, ordered by line.
pub fn project<'a>(annotations: impl IntoIterator<Item = &'a Annotation>, show_inline: bool) -> Vec<LineDecoration> {
    let mut winners: BTreeMap<usize, &Annotation> = BTreeMap::new();
    for annotation in annotations {
        for line in annotation.range.lines() {
            let replace = winners
                .get(&line)
                .map_or(true, |current| precedence(annotation.status) > precedence(current.status));
            if replace {
                winners.insert(line, annotation);
            }
        }
    }

    winners
        .into_iter()
        .map(|(line, annotation)| {
            let hover_text = match &annotation.detail {
                Some(detail) => format!("{}\n{}", annotation.status.hover_title(), detail),
                None => annotation.status.hover_title().to_string(),
            };
            LineDecoration {
                line,
                style_class: annotation.status.style_class().to_string(),
                inline_label: show_inline.then(|| annotation.status.inline_label().to_string()),
                hover_text,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structs::validation_report::ValidationIssue;
    use crate::traits::editor_surface::MockEditorSurface;

    fn permissive_surface() -> Arc<dyn EditorSurface> {
        let mut surface = MockEditorSurface::new();
        surface.expect_apply_annotations().returning(|_, _| ());
        surface.expect_clear_annotations().returning(|_| ());
        surface.expect_active_file().returning(|| None);
        Arc::new(surface)
    }

    #[test]
    fn projection_is_one_descriptor_per_line() {
        let annotations = vec![Annotation::new(DecorationStatus::Pending, LineRange::new(3, 5))];

        let decorations = project(&annotations, true);

        assert_eq!(decorations.iter().map(|d| d.line).collect::<Vec<_>>(), vec![3, 4, 5]);
        assert_eq!(decorations[0].style_class, "approval-pending");
        assert_eq!(decorations[0].inline_label.as_deref(), Some("⏳ Pending approval"));
    }

    #[test]
    fn most_severe_status_wins_a_shared_line() {
        let annotations = vec![
            Annotation::new(DecorationStatus::Approved, LineRange::new(1, 2)),
            Annotation::new(DecorationStatus::ValidationError, LineRange::single(2)).with_detail("missing semicolon"),
        ];

        let decorations = project(&annotations, false);

        assert_eq!(decorations[0].style_class, "approval-approved");
        assert_eq!(decorations[1].style_class, "validation-error");
        assert!(decorations[1].hover_text.ends_with("missing semicolon"));
        assert!(decorations.iter().all(|d| d.inline_label.is_none()));
    }

    #[test]
    fn config_change_reprojects_from_current_state() {
        let projector = DecorationProjector::new(permissive_surface(), true);
        projector.set_status("a.ts", DecorationStatus::Pending, &[LineRange::single(1)]);
        let with_labels = projector.decorations("a.ts");

        projector.on_config_changed(false);
        projector.on_config_changed(true);

        assert_eq!(projector.decorations("a.ts"), with_labels);
    }

    #[test]
    fn visible_again_reapplies_without_new_state() {
        let mut surface = MockEditorSurface::new();
        surface
            .expect_apply_annotations()
            .withf(|file, _| file == "a.ts")
            .times(2)
            .returning(|_, _| ());
        let projector = DecorationProjector::new(Arc::new(surface), true);

        projector.set_status("a.ts", DecorationStatus::Rejected, &[LineRange::single(4)]);
        projector.on_visible("a.ts");
        projector.on_visible("untracked.ts");
    }

    #[test]
    fn clear_removes_one_file_or_everything() {
        let projector = DecorationProjector::new(permissive_surface(), true);
        projector.set_status("a.ts", DecorationStatus::Pending, &[LineRange::single(1)]);
        projector.set_status("b.ts", DecorationStatus::Pending, &[LineRange::single(1)]);

        projector.clear("a.ts");
        assert_eq!(projector.files(), vec!["b.ts"]);

        projector.clear_all();
        assert!(projector.files().is_empty());
        assert!(projector.decorations("b.ts").is_empty());
    }

    #[test]
    fn validation_layer_survives_approval_updates() {
        let projector = DecorationProjector::new(permissive_surface(), true);
        projector.apply_validation(&ValidationReport {
            file_path: "a.ts".to_string(),
            valid: false,
            issues: vec![ValidationIssue {
                line: 9,
                end_line: None,
                severity: IssueSeverity::Warning,
                message: "unused import".to_string(),
            }],
        });

        projector.mark_changes("a.ts", DecorationStatus::Approved, &[LineChange::added(2, "x")]);
        projector.on_workflow_event(&WorkflowEvent::ApprovalExpired {
            workflow_id: "w".to_string(),
            file_path: "a.ts".to_string(),
            request_id: "r".to_string(),
        });

        let decorations = projector.decorations("a.ts");
        assert_eq!(decorations.len(), 1);
        assert_eq!(decorations[0].style_class, "validation-warning");
    }

    #[test]
    fn granted_approval_marks_the_submitted_lines() {
        let projector = DecorationProjector::new(permissive_surface(), true);

        projector.on_workflow_event(&WorkflowEvent::ApprovalGranted {
            workflow_id: "w".to_string(),
            file_path: "a.ts".to_string(),
            request_id: "r".to_string(),
            changes: vec![LineChange::added(1, "a"), LineChange::deleted(7, "b")],
        });

        let lines: Vec<(usize, String)> = projector
            .decorations("a.ts")
            .into_iter()
            .map(|d| (d.line, d.style_class))
            .collect();
        assert_eq!(
            lines,
            vec![(1, "approval-approved".to_string()), (7, "approval-approved".to_string())]
        );
    }
}
