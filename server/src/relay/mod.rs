//! Command relay to player robots
//!
//! This module handles:
//! - Gating commands on registration and the penalty window
//! - Delegating command-level auth to a pluggable verifier
//! - Forwarding payloads to robots and mapping their replies

mod pipeline;
mod verifier;

pub use pipeline::CommandRelay;
pub use verifier::{CommandVerifier, RobotSideVerifier};
