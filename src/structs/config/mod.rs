pub mod config;
pub mod notification_config;
pub mod policy_config;
pub mod timer_config;
