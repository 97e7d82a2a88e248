pub mod api_response;
pub mod approval_request;
pub mod approval_response;
pub mod bulk_outcome;
pub mod change_history_entry;
pub mod cli;
pub mod config;
pub mod content_change;
pub mod engine_status;
pub mod file_change;
pub mod history_group;
pub mod line_change;
pub mod line_decoration;
pub mod line_history_entry;
pub mod line_range;
pub mod mutation_analysis;
pub mod new_approval_request;
pub mod notification_action;
pub mod notification_record;
pub mod paginated;
pub mod push_connection;
pub mod push_message;
pub mod queue_filter;
pub mod tree_node;
pub mod validation_report;
pub mod workflow_session;
