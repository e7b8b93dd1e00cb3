//! azls CLI library
//!
//! The command implementations live here so integration tests can reach
//! them; `main.rs` only parses arguments and dispatches.

pub mod commands;
pub mod config;
pub mod credentials;
pub mod error;
pub mod logging;
pub mod output;
