use serde::Serialize;

/// Host-agnostic node of a tree view snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeNode {
    pub id: String,
    pub label: String,
    pub description: Option<String>,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn leaf(id: &str, label: &str, description: Option<String>) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            description,
            children: Vec::new(),
        }
    }

    pub fn group(id: &str, label: &str, children: Vec<TreeNode>) -> Self {
        let description = Some(format!("{}", children.len()));
        Self {
            id: id.to_string(),
            label: label.to_string(),
            description,
            children,
        }
    }
}
