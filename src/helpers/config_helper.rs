use crate::config::constants::{
    DEFAULT_APPROVAL_TIMEOUT_SECS, DEFAULT_AUTO_HIDE_DELAY_MS, DEFAULT_ENGINE_URL,
    DEFAULT_HEARTBEAT_INTERVAL_SECS, DEFAULT_MAX_RECONNECT_ATTEMPTS, DEFAULT_NOTIFICATION_DRAIN_MS,
    DEFAULT_NOTIFICATION_HISTORY_CAPACITY, DEFAULT_QUEUE_REFRESH_SECS, DEFAULT_RECONNECT_BASE_DELAY_MS,
    DEFAULT_WORKFLOW_POLL_SECS,
};

pub struct ConfigHelper;

impl ConfigHelper {
    pub fn default_engine_url() -> String {
        DEFAULT_ENGINE_URL.to_string()
    }

    pub fn default_true() -> bool {
        true
    }

    pub fn default_approval_timeout() -> u64 {
        DEFAULT_APPROVAL_TIMEOUT_SECS
    }

    pub fn default_change_count_threshold() -> usize {
        5
    }

    pub fn default_high_priority_change_threshold() -> usize {
        20
    }

    pub fn default_structural_keywords() -> Vec<String> {
        vec![
            "import".to_string(),
            "export".to_string(),
            "delete".to_string(),
        ]
    }

    pub fn default_high_risk_levels() -> Vec<String> {
        vec!["high".to_string(), "critical".to_string()]
    }

    pub fn default_reconnect_base_delay_ms() -> u64 {
        DEFAULT_RECONNECT_BASE_DELAY_MS
    }

    pub fn default_max_reconnect_attempts() -> u32 {
        DEFAULT_MAX_RECONNECT_ATTEMPTS
    }

    pub fn default_heartbeat_interval_secs() -> u64 {
        DEFAULT_HEARTBEAT_INTERVAL_SECS
    }

    pub fn default_queue_refresh_secs() -> u64 {
        DEFAULT_QUEUE_REFRESH_SECS
    }

    pub fn default_workflow_poll_secs() -> u64 {
        DEFAULT_WORKFLOW_POLL_SECS
    }

    pub fn default_notification_drain_ms() -> u64 {
        DEFAULT_NOTIFICATION_DRAIN_MS
    }

    pub fn default_auto_hide_delay_ms() -> u64 {
        DEFAULT_AUTO_HIDE_DELAY_MS
    }

    pub fn default_history_capacity() -> usize {
        DEFAULT_NOTIFICATION_HISTORY_CAPACITY
    }
}
