use serde::{Deserialize, Serialize};
use crate::helpers::config_helper::ConfigHelper;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct NotificationConfig {
    #[serde(default = "ConfigHelper::default_true")]
    pub auto_hide: bool,

    #[serde(default = "ConfigHelper::default_auto_hide_delay_ms")]
    pub auto_hide_delay_ms: u64,

    #[serde(default = "ConfigHelper::default_history_capacity")]
    pub history_capacity: usize,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            auto_hide: true,
            auto_hide_delay_ms: ConfigHelper::default_auto_hide_delay_ms(),
            history_capacity: ConfigHelper::default_history_capacity(),
        }
    }
}
