use serde::{Deserialize, Serialize};

/// Renderable annotation for a single line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineDecoration {
    pub line: usize,
    pub style_class: String,
    pub inline_label: Option<String>,
    pub hover_text: String,
}
