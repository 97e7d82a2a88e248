use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::enums::notification_type::NotificationType;
use crate::structs::notification_action::NotificationAction;

pub const PRIORITY_CRITICAL: u8 = 1;
pub const PRIORITY_HIGH: u8 = 2;
pub const PRIORITY_NORMAL: u8 = 3;
pub const PRIORITY_LOW: u8 = 4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationRecord {
    pub id: String,
    /// 1 is the most urgent, 4 the least.
    pub priority: u8,
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub actions: Vec<NotificationAction>,
    pub auto_hide: bool,
    pub auto_hide_delay_ms: u64,
    #[serde(default)]
    pub request_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl NotificationRecord {
    pub fn new(id: &str, priority: u8, notification_type: NotificationType, title: &str, message: &str) -> Self {
        Self {
            id: id.to_string(),
            priority: priority.clamp(PRIORITY_CRITICAL, PRIORITY_LOW),
            notification_type,
            title: title.to_string(),
            message: message.to_string(),
            actions: Vec::new(),
            auto_hide: true,
            auto_hide_delay_ms: 5000,
            request_id: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_action(mut self, action: NotificationAction) -> Self {
        self.actions.push(action);
        self
    }

    pub fn with_request(mut self, request_id: &str) -> Self {
        self.request_id = Some(request_id.to_string());
        self
    }

    pub fn find_action(&self, title: &str) -> Option<&NotificationAction> {
        self.actions.iter().find(|a| a.title == title)
    }
}
