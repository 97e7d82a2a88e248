use crate::errors::ClientError;

/// Result of a bulk approve/reject/cancel run.
#[derive(Debug, Clone, Default)]
pub struct BulkOutcome {
    pub succeeded: Vec<String>,
    pub failed: Vec<(String, ClientError)>,
}

impl BulkOutcome {
    pub fn is_partial_failure(&self) -> bool {
        !self.succeeded.is_empty() && !self.failed.is_empty()
    }

    pub fn summary(&self, verb: &str) -> String {
        if self.failed.is_empty() {
            return format!("{} {} request(s)", verb, self.succeeded.len());
        }
        let failed_ids: Vec<&str> = self.failed.iter().map(|(id, _)| id.as_str()).collect();
        format!(
            "{} {} request(s), {} failed: {}",
            verb,
            self.succeeded.len(),
            self.failed.len(),
            failed_ids.join(", ")
        )
    }
}
