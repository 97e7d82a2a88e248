use serde::{Deserialize, Serialize};
use crate::helpers::config_helper::ConfigHelper;

/// Knobs of the approval-required heuristic.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PolicyConfig {
    #[serde(default = "ConfigHelper::default_change_count_threshold")]
    pub change_count_threshold: usize,

    #[serde(default = "ConfigHelper::default_high_priority_change_threshold")]
    pub high_priority_change_threshold: usize,

    #[serde(default = "ConfigHelper::default_structural_keywords")]
    pub structural_keywords: Vec<String>,

    #[serde(default = "ConfigHelper::default_true")]
    pub deletions_require_approval: bool,

    #[serde(default = "ConfigHelper::default_high_risk_levels")]
    pub high_risk_levels: Vec<String>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            change_count_threshold: ConfigHelper::default_change_count_threshold(),
            high_priority_change_threshold: ConfigHelper::default_high_priority_change_threshold(),
            structural_keywords: ConfigHelper::default_structural_keywords(),
            deletions_require_approval: true,
            high_risk_levels: ConfigHelper::default_high_risk_levels(),
        }
    }
}
