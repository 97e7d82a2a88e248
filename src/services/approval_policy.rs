use regex::Regex;
use crate::enums::priority::Priority;
use crate::errors::{ClientError, ClientResult};
use crate::structs::config::policy_config::PolicyConfig;
use crate::structs::line_change::LineChange;
use crate::structs::mutation_analysis::MutationAnalysis;

/// Why a change set needs a human decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RiskSignals {
    pub change_count: usize,
    pub has_deletions: bool,
    pub has_structural_keyword: bool,
    pub high_risk_file: bool,
}

/// The approval-required gate: count threshold, deletions, structural
/// keywords, or an external risk flag.
pub struct ApprovalPolicy {
    config: PolicyConfig,
    keyword_pattern: Option<Regex>,
}

impl ApprovalPolicy {
    pub fn new(config: PolicyConfig) -> ClientResult<Self> {
        let keyword_pattern = Self::compile_keywords(&config.structural_keywords)?;
        Ok(Self {
            config,
            keyword_pattern,
        })
    }

    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    pub fn signals(&self, changes: &[LineChange], analysis: Option<&MutationAnalysis>) -> RiskSignals {
        RiskSignals {
            change_count: changes.len(),
            has_deletions: changes.iter().any(LineChange::is_deletion),
            has_structural_keyword: changes
                .iter()
                .filter_map(LineChange::introduced_content)
                .any(|content| self.contains_structural_keyword(content)),
            high_risk_file: analysis.map_or(false, |a| a.is_high_risk(&self.config.high_risk_levels)),
        }
    }

    pub fn requires_approval(&self, changes: &[LineChange], analysis: Option<&MutationAnalysis>) -> bool {
        if changes.is_empty() {
            return false;
        }
        let signals = self.signals(changes, analysis);
        signals.change_count > self.config.change_count_threshold
            || (self.config.deletions_require_approval && signals.has_deletions)
            || signals.has_structural_keyword
            || signals.high_risk_file
    }

    pub fn priority_for(&self, changes: &[LineChange], analysis: Option<&MutationAnalysis>) -> Priority {
        let signals = self.signals(changes, analysis);
        if signals.has_deletions
            || signals.change_count > self.config.high_priority_change_threshold
            || signals.has_structural_keyword
        {
            Priority::High
        } else if signals.change_count > self.config.change_count_threshold {
            Priority::Medium
        } else {
            Priority::Low
        }
    }

    pub fn contains_structural_keyword(&self, content: &str) -> bool {
        self.keyword_pattern
            .as_ref()
            .map_or(false, |pattern| pattern.is_match(content))
    }

    fn compile_keywords(keywords: &[String]) -> ClientResult<Option<Regex>> {
        let alternatives: Vec<String> = keywords
            .iter()
            .map(|k| k.trim())
            .filter(|k| !k.is_empty())
            .map(regex::escape)
            .collect();
        if alternatives.is_empty() {
            return Ok(None);
        }
        let pattern = format!(r"\b(?:{})\b", alternatives.join("|"));
        Regex::new(&pattern)
            .map(Some)
            .map_err(|e| ClientError::config_error(&e.to_string(), Some("policy.structural_keywords"), None))
    }
}
