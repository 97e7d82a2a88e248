pub mod approval_policy;
pub mod approval_queue;
pub mod change_history;
pub mod connection_manager;
pub mod decoration_projector;
pub mod edit_translator;
pub mod engine_client;
pub mod history_exporter;
pub mod notification_coordinator;
pub mod push_channel;
pub mod scheduler;
pub mod tree_snapshot;
pub mod workflow_manager;

#[cfg(test)]
pub mod fake_engine;
