use crate::structs::line_decoration::LineDecoration;

/// The parts of the hosting editor the core writes to.
#[cfg_attr(test, mockall::automock)]
pub trait EditorSurface: Send + Sync {
    fn active_file(&self) -> Option<String>;

    fn apply_annotations(&self, file_path: &str, decorations: &[LineDecoration]);

    fn clear_annotations(&self, file_path: &str);
}
