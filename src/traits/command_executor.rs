use async_trait::async_trait;
use crate::errors::ClientResult;

/// Entry point for named host commands bound to notification actions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    async fn execute(&self, command: &str, args: &[serde_json::Value]) -> ClientResult<()>;
}
