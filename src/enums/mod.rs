pub mod approval_status;
pub mod change_type;
pub mod commands;
pub mod connection_event;
pub mod connection_status;
pub mod decoration_status;
pub mod export_format;
pub mod history_event;
pub mod http_method;
pub mod notification_type;
pub mod priority;
pub mod push_message_type;
pub mod queue_event;
pub mod save_outcome;
pub mod session_status;
pub mod workflow_event;
