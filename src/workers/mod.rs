pub mod client_context;
pub mod command_runner;
