//! Robot Arena reference robot node
//!
//! Serves the robot API consumed by the dispatcher: a liveness ping and a
//! control endpoint that checks each command's token and hands the payload
//! to the handler registered for its `action`.

pub mod command;
pub mod config;
pub mod http;
