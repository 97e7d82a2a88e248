use std::time::Duration;
use serde::{Deserialize, Serialize};
use crate::helpers::config_helper::ConfigHelper;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct TimerConfig {
    #[serde(default = "ConfigHelper::default_reconnect_base_delay_ms")]
    pub reconnect_base_delay_ms: u64,

    #[serde(default = "ConfigHelper::default_max_reconnect_attempts")]
    pub max_reconnect_attempts: u32,

    #[serde(default = "ConfigHelper::default_heartbeat_interval_secs")]
    pub heartbeat_interval_secs: u64,

    #[serde(default = "ConfigHelper::default_queue_refresh_secs")]
    pub queue_refresh_secs: u64,

    #[serde(default = "ConfigHelper::default_workflow_poll_secs")]
    pub workflow_poll_secs: u64,

    #[serde(default = "ConfigHelper::default_notification_drain_ms")]
    pub notification_drain_ms: u64,
}

impl TimerConfig {
    pub fn reconnect_base_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_base_delay_ms)
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_secs)
    }

    pub fn queue_refresh_interval(&self) -> Duration {
        Duration::from_secs(self.queue_refresh_secs)
    }

    pub fn workflow_poll_interval(&self) -> Duration {
        Duration::from_secs(self.workflow_poll_secs)
    }

    pub fn notification_drain_interval(&self) -> Duration {
        Duration::from_millis(self.notification_drain_ms)
    }
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            reconnect_base_delay_ms: ConfigHelper::default_reconnect_base_delay_ms(),
            max_reconnect_attempts: ConfigHelper::default_max_reconnect_attempts(),
            heartbeat_interval_secs: ConfigHelper::default_heartbeat_interval_secs(),
            queue_refresh_secs: ConfigHelper::default_queue_refresh_secs(),
            workflow_poll_secs: ConfigHelper::default_workflow_poll_secs(),
            notification_drain_ms: ConfigHelper::default_notification_drain_ms(),
        }
    }
}
