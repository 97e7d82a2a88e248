use async_trait::async_trait;
use crate::structs::notification_record::NotificationRecord;

/// Interactive prompts shown by the host.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserPrompt: Send + Sync {
    /// Asks a yes/no question; destructive bulk actions wait on this.
    async fn confirm(&self, message: &str) -> bool;

    /// Shows a notification and returns the title of the selected action, if any.
    async fn present(&self, notification: &NotificationRecord) -> Option<String>;
}
