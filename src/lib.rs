//! Editor-side client for an approval Engine.
//!
//! Tracks per-file edits, asks the Engine for a human decision when a change
//! set looks risky, and keeps the approval queue, change history,
//! notifications and line annotations in sync with the Engine's answers.
//! [`workers::client_context::ClientContext`] wires everything together.

pub mod config;
pub mod enums;
pub mod errors;
pub mod helpers;
pub mod logger;
pub mod services;
pub mod structs;
pub mod traits;
pub mod ui;
pub mod workers;
