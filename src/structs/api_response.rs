use serde::{Deserialize, Serialize};
use crate::errors::{ClientError, ClientResult};

/// Envelope every Engine endpoint answers with.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            error: None,
        }
    }

    pub fn failure(error: &str) -> Self {
        Self {
            success: false,
            data: None,
            message: None,
            error: Some(error.to_string()),
        }
    }

    /// Unwraps the payload, turning an unsuccessful envelope into an engine error.
    pub fn into_data(self, path: &str) -> ClientResult<T> {
        if !self.success {
            let message = self.error.or(self.message).unwrap_or_else(|| "unknown engine error".to_string());
            return Err(ClientError::engine_refused(&message));
        }
        self.data.ok_or_else(|| ClientError::parse("JSON", &format!("empty payload from {}", path)))
    }
}
