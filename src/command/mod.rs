//! Command execution for the robot node
//!
//! This module handles:
//! - Checking each command's auth token
//! - Dispatching payloads to handlers by their `action` key
//! - Mapping handler results to robot API status codes

mod executor;
pub mod handlers;

pub use executor::{CommandExecutor, CommandResult, Execution};
