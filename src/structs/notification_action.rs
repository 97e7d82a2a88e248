use serde::{Deserialize, Serialize};

/// A selectable affordance on a notification, bound to a host command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationAction {
    pub title: String,
    pub command: String,
    #[serde(default)]
    pub args: Vec<serde_json::Value>,
}

impl NotificationAction {
    pub fn new(title: &str, command: &str, args: Vec<serde_json::Value>) -> Self {
        Self {
            title: title.to_string(),
            command: command.to_string(),
            args,
        }
    }
}
