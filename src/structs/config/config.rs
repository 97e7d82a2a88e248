use serde::{Deserialize, Serialize};
use crate::helpers::config_helper::ConfigHelper;
use crate::structs::config::notification_config::NotificationConfig;
use crate::structs::config::policy_config::PolicyConfig;
use crate::structs::config::timer_config::TimerConfig;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    #[serde(default = "ConfigHelper::default_engine_url")]
    pub engine_url: String,

    #[serde(default)]
    pub api_key: String,

    #[serde(default = "ConfigHelper::default_true")]
    pub auto_connect: bool,

    #[serde(default = "ConfigHelper::default_true")]
    pub approval_notifications: bool,

    #[serde(default = "ConfigHelper::default_true")]
    pub real_time_updates: bool,

    /// Seconds; advisory only, the Engine's `expiresAt` governs expiry.
    #[serde(default = "ConfigHelper::default_approval_timeout")]
    pub approval_timeout: u64,

    #[serde(default = "ConfigHelper::default_true")]
    pub show_inline_decorations: bool,

    #[serde(default)]
    pub policy: PolicyConfig,

    #[serde(default)]
    pub timers: TimerConfig,

    #[serde(default)]
    pub notifications: NotificationConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            engine_url: ConfigHelper::default_engine_url(),
            api_key: String::new(),
            auto_connect: true,
            approval_notifications: true,
            real_time_updates: true,
            approval_timeout: ConfigHelper::default_approval_timeout(),
            show_inline_decorations: true,
            policy: PolicyConfig::default(),
            timers: TimerConfig::default(),
            notifications: NotificationConfig::default(),
        }
    }
}
