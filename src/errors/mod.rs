use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Serialize, Deserialize)]
pub enum ClientError {
    // Transport-level failures: unreachable, timeout, auth rejected
    #[error("connection error on '{path}': {reason}")]
    Connection {
        path: String,
        reason: String,
    },

    // Engine-reported content/schema issues
    #[error("validation error for '{field}': {reason}")]
    Validation {
        field: String,
        reason: String,
    },

    // Submission/decision failures
    #[error("approval {operation} failed for '{request_id}': {reason}")]
    Approval {
        request_id: String,
        operation: String,
        reason: String,
    },

    // Any other non-2xx answer, or a 2xx envelope with `success: false`
    #[error("engine error{}: {message}", .status.map(|s| format!(" (status {})", s)).unwrap_or_default())]
    Engine {
        status: Option<u16>,
        message: String,
    },

    #[error("configuration error: {message}")]
    Configuration {
        message: String,
        field: Option<String>,
        suggestion: Option<String>,
    },

    #[error("parse error in {content_type}: {reason}")]
    Parse {
        content_type: String,
        reason: String,
    },

    #[error("{entity} '{id}' not found")]
    NotFound {
        entity: String,
        id: String,
    },

    #[error("{operation} cancelled by user")]
    Cancelled {
        operation: String,
    },

    #[error("system error during {operation}: {reason}")]
    System {
        operation: String,
        reason: String,
    },
}

impl ClientError {
    pub fn connection(path: &str, reason: &str) -> Self {
        Self::Connection {
            path: path.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn validation(field: &str, reason: &str) -> Self {
        Self::Validation {
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn approval(request_id: &str, operation: &str, reason: &str) -> Self {
        Self::Approval {
            request_id: request_id.to_string(),
            operation: operation.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn engine(status: u16, message: &str) -> Self {
        Self::Engine {
            status: Some(status),
            message: message.to_string(),
        }
    }

    /// The Engine answered, but refused the call in its response envelope.
    pub fn engine_refused(message: &str) -> Self {
        Self::Engine {
            status: None,
            message: message.to_string(),
        }
    }

    pub fn config_error(message: &str, field: Option<&str>, suggestion: Option<&str>) -> Self {
        Self::Configuration {
            message: message.to_string(),
            field: field.map(ToString::to_string),
            suggestion: suggestion.map(ToString::to_string),
        }
    }

    pub fn parse(content_type: &str, reason: &str) -> Self {
        Self::Parse {
            content_type: content_type.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn not_found(entity: &str, id: &str) -> Self {
        Self::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }

    pub fn cancelled(operation: &str) -> Self {
        Self::Cancelled {
            operation: operation.to_string(),
        }
    }

    pub fn system_error(operation: &str, reason: &str) -> Self {
        Self::System {
            operation: operation.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection { .. })
    }

    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Connection { .. } => true,
            Self::Approval { .. } => true,
            Self::Engine { status, .. } => status.map_or(false, |s| s >= 500),
            Self::Validation { .. } => true,
            Self::Cancelled { .. } => true,
            Self::Configuration { .. } => false,
            Self::Parse { .. } => false,
            Self::NotFound { .. } => false,
            Self::System { .. } => false,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::System { .. } => ErrorSeverity::Critical,
            Self::Connection { .. } => ErrorSeverity::High,
            Self::Approval { .. } => ErrorSeverity::High,
            Self::Engine { .. } => ErrorSeverity::Medium,
            Self::Parse { .. } => ErrorSeverity::Medium,
            Self::Configuration { .. } => ErrorSeverity::Medium,
            Self::Validation { .. } => ErrorSeverity::Low,
            Self::NotFound { .. } => ErrorSeverity::Low,
            Self::Cancelled { .. } => ErrorSeverity::Low,
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            Self::Connection { path, reason } => {
                format!("Cannot reach the Engine ({}): {}\n💡 Check the engine URL and API key, then reconnect", path, reason)
            }
            Self::Validation { field, reason } => {
                format!("The Engine rejected '{}': {}", field, reason)
            }
            Self::Approval { request_id, operation, reason } => {
                let mut msg = format!("Could not {} approval", operation);
                if !request_id.is_empty() {
                    msg.push_str(&format!(" '{}'", request_id));
                }
                msg.push_str(&format!(": {}\n💡 You can retry the operation", reason));
                msg
            }
            Self::Engine { status: Some(status), message } => {
                format!("Engine error (HTTP {}): {}", status, message)
            }
            Self::Engine { status: None, message } => {
                format!("The Engine refused the request: {}", message)
            }
            Self::Configuration { message, field, suggestion } => {
                let mut msg = format!("Configuration Error: {}", message);
                if let Some(field) = field {
                    msg.push_str(&format!(" (field: {})", field));
                }
                if let Some(suggestion) = suggestion {
                    msg.push_str(&format!("\n💡 Suggestion: {}", suggestion));
                }
                msg
            }
            Self::Parse { content_type, reason } => {
                format!("Could not read {} data: {}", content_type, reason)
            }
            Self::NotFound { entity, id } => {
                format!("{} '{}' was not found", entity, id)
            }
            Self::Cancelled { operation } => {
                format!("{} was cancelled", operation)
            }
            Self::System { operation, reason } => {
                format!("System error during {}: {}", operation, reason)
            }
        }
    }

    pub fn technical_details(&self) -> String {
        format!("{:?}", self)
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    pub fn emoji(&self) -> &'static str {
        match self {
            Self::Low => "🟢",
            Self::Medium => "🟡",
            Self::High => "🟠",
            Self::Critical => "🔴",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        }
    }
}

/// Result type alias for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Logs an error with its severity tag and technical details.
pub fn log_error(context: &str, error: &ClientError) {
    let severity = error.severity();
    log::error!("{} [{}] {}: {}", severity.emoji(), severity.name(), context, error.technical_details());
}

impl From<std::io::Error> for ClientError {
    fn from(error: std::io::Error) -> Self {
        ClientError::System {
            operation: "I/O operation".to_string(),
            reason: error.to_string(),
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(error: serde_json::Error) -> Self {
        ClientError::Parse {
            content_type: "JSON".to_string(),
            reason: error.to_string(),
        }
    }
}

impl From<toml::de::Error> for ClientError {
    fn from(error: toml::de::Error) -> Self {
        ClientError::Parse {
            content_type: "TOML".to_string(),
            reason: error.message().to_string(),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(error: reqwest::Error) -> Self {
        let path = error.url().map(|u| u.path().to_string()).unwrap_or_default();
        ClientError::Connection {
            path,
            reason: error.to_string(),
        }
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for ClientError {
    fn from(error: tokio_tungstenite::tungstenite::Error) -> Self {
        ClientError::Connection {
            path: "/ws".to_string(),
            reason: error.to_string(),
        }
    }
}
