pub mod config_helper;
pub mod in_flight;
