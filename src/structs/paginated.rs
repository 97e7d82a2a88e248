use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    pub items: Vec<T>,
    #[serde(default)]
    pub total: usize,
    pub page: u32,
    pub limit: u32,
    #[serde(default)]
    pub has_more: bool,
}
