//! Robot Arena Shared Protocol Types
//!
//! This crate provides the wire types, the robot reply codec and the
//! per-player penalty state machine shared by the dispatcher and robot nodes.

pub mod codec;
pub mod proto;
pub mod state_machine;

use std::fmt;
use subtle::ConstantTimeEq;

pub use proto::*;

/// Timing parameters for the arena
pub mod timing {
    /// Duration of a penalty window in milliseconds
    pub const PENALTY_WINDOW_MS: u64 = 3000;

    /// Timeout for the liveness probe issued at first registration
    pub const PROBE_TIMEOUT_MS: u64 = 2000;

    /// Timeout for relaying a command to a robot
    pub const RELAY_TIMEOUT_MS: u64 = 5000;

    /// Default listen address of the dispatcher
    pub const DISPATCHER_LISTEN: &str = "0.0.0.0:8000";

    /// Default listen address of a robot node
    pub const ROBOT_LISTEN: &str = "0.0.0.0:8001";
}

/// Compare a presented secret with the expected one in constant time
pub fn secrets_match(expected: &str, presented: &str) -> bool {
    bool::from(expected.as_bytes().ct_eq(presented.as_bytes()))
}

/// Network location of a robot's REST API
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RobotEndpoint {
    pub address: String,
    pub port: u16,
}

impl RobotEndpoint {
    pub fn new(address: impl Into<String>, port: u16) -> Self {
        Self {
            address: address.into(),
            port,
        }
    }

    /// Base URL of the robot API, bracketing IPv6 literals
    pub fn base_url(&self) -> String {
        if self.address.contains(':') && !self.address.starts_with('[') {
            format!("http://[{}]:{}", self.address, self.port)
        } else {
            format!("http://{}:{}", self.address, self.port)
        }
    }

    pub fn ping_url(&self) -> String {
        format!("{}/robot/ping", self.base_url())
    }

    pub fn control_url(&self) -> String {
        format!("{}/robot/control", self.base_url())
    }
}

impl fmt::Display for RobotEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.address, self.port)
    }
}

impl Command {
    /// Create a command from a payload and its per-command auth token
    pub fn new(payload: serde_json::Map<String, serde_json::Value>, auth: impl Into<String>) -> Self {
        Self {
            payload,
            auth: auth.into(),
        }
    }

    /// The dispatch key robot nodes route on, if present
    pub fn action(&self) -> Option<&str> {
        self.payload.get("action").and_then(|v| v.as_str())
    }
}
