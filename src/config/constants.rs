use std::time::Duration;

pub const DEFAULT_ENGINE_URL: &str = "http://localhost:3000";
pub const CONFIG_DIR_NAME: &str = ".approval-client";
pub const CONFIG_FILE_NAME: &str = "config.toml";

pub const ENGINE_URL_ENV: &str = "APPROVAL_ENGINE_URL";
pub const API_KEY_ENV: &str = "APPROVAL_API_KEY";

pub const DEFAULT_APPROVAL_TIMEOUT_SECS: u64 = 300;
pub const DEFAULT_RECONNECT_BASE_DELAY_MS: u64 = 1000;
pub const DEFAULT_MAX_RECONNECT_ATTEMPTS: u32 = 5;
pub const DEFAULT_HEARTBEAT_INTERVAL_SECS: u64 = 30;
pub const DEFAULT_QUEUE_REFRESH_SECS: u64 = 30;
pub const DEFAULT_WORKFLOW_POLL_SECS: u64 = 10;
pub const DEFAULT_NOTIFICATION_DRAIN_MS: u64 = 100;
pub const DEFAULT_AUTO_HIDE_DELAY_MS: u64 = 5000;
pub const DEFAULT_NOTIFICATION_HISTORY_CAPACITY: usize = 100;

pub const HISTORY_PAGE_SIZE: u32 = 50;
pub const PENDING_PAGE_SIZE: u32 = 50;
pub const MAX_PENDING_PAGES: u32 = 20;
pub const HTTP_TIMEOUT_SECS: u64 = 30;
pub const EVENT_BUS_CAPACITY: usize = 256;
pub const PUSH_CHANNEL_PATH: &str = "/ws";

// Scheduler timer names
pub const TIMER_RECONNECT: &str = "transport.reconnect";
pub const TIMER_HEARTBEAT: &str = "transport.heartbeat";
pub const TIMER_PUSH_READER: &str = "transport.push-reader";
pub const TIMER_QUEUE_REFRESH: &str = "queue.auto-refresh";
pub const TIMER_WORKFLOW_POLL: &str = "workflow.status-poll";
pub const TIMER_NOTIFICATION_DRAIN: &str = "notifications.drain";

pub fn sleep_duration_secs(seconds: u64) -> Duration {
    Duration::from_secs(seconds)
}

pub fn sleep_duration_millis(milliseconds: u64) -> Duration {
    Duration::from_millis(milliseconds)
}

// Host commands bound to notification actions
pub const CMD_APPROVE: &str = "approval.approve";
pub const CMD_REJECT: &str = "approval.reject";
pub const CMD_VIEW_REQUEST: &str = "approval.viewRequest";
pub const CMD_RECONNECT: &str = "approval.reconnect";
pub const CMD_OPEN_SETTINGS: &str = "approval.openSettings";
pub const CMD_REFRESH_QUEUE: &str = "approval.refreshQueue";
pub const CMD_REQUEST_APPROVAL: &str = "approval.requestApproval";

// Event routing tasks owned by the scheduler
pub const TASK_PUSH_ROUTER: &str = "router.push";
pub const TASK_WORKFLOW_ROUTER: &str = "router.workflow";
pub const TASK_CONNECTION_ROUTER: &str = "router.connection";
