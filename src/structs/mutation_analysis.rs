use serde::{Deserialize, Serialize};

/// Risk metadata returned by `POST /analyze/mutations`. Opaque apart from
/// the risk level, which feeds the approval heuristic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationAnalysis {
    #[serde(default)]
    pub file_path: String,
    pub risk_level: String,
    #[serde(default)]
    pub impact_score: f64,
    #[serde(default)]
    pub details: serde_json::Value,
}

impl MutationAnalysis {
    pub fn is_high_risk(&self, high_risk_levels: &[String]) -> bool {
        high_risk_levels.iter().any(|level| level.eq_ignore_ascii_case(&self.risk_level))
    }
}
