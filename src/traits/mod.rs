pub mod command_executor;
pub mod editor_surface;
pub mod engine_api;
pub mod push_connector;
pub mod user_prompt;
