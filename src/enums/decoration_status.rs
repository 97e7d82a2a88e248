use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DecorationStatus {
    Pending,
    Approved,
    Rejected,
    Conflict,
    ValidationError,
    ValidationWarning,
    AutoApproved,
}

impl DecorationStatus {
    pub fn style_class(&self) -> &'static str {
        match self {
            DecorationStatus::Pending => "approval-pending",
            DecorationStatus::Approved => "approval-approved",
            DecorationStatus::Rejected => "approval-rejected",
            DecorationStatus::Conflict => "approval-conflict",
            DecorationStatus::ValidationError => "validation-error",
            DecorationStatus::ValidationWarning => "validation-warning",
            DecorationStatus::AutoApproved => "approval-auto-approved",
        }
    }

    pub fn inline_label(&self) -> &'static str {
        match self {
            DecorationStatus::Pending => "⏳ Pending approval",
            DecorationStatus::Approved => "✅ Approved",
            DecorationStatus::Rejected => "❌ Rejected",
            DecorationStatus::Conflict => "⚠️ Conflict",
            DecorationStatus::ValidationError => "🛑 Validation error",
            DecorationStatus::ValidationWarning => "⚠️ Validation warning",
            DecorationStatus::AutoApproved => "✔️ Auto-approved",
        }
    }

    pub fn hover_title(&self) -> &'static str {
        match self {
            DecorationStatus::Pending => "Change awaiting human approval",
            DecorationStatus::Approved => "Change approved",
            DecorationStatus::Rejected => "Change rejected",
            DecorationStatus::Conflict => "Change conflicts with the Engine state",
            DecorationStatus::ValidationError => "Engine validation error",
            DecorationStatus::ValidationWarning => "Engine validation warning",
            DecorationStatus::AutoApproved => "Low-risk change approved automatically",
        }
    }
}
