//! Dispatcher error kinds

use thiserror::Error;

/// Errors surfaced by the registry, penalty clock, bonus ledger and relay
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("Player not registered: {0}")]
    NotFound(String),

    #[error("Authentication failed for player {0}")]
    AuthFailed(String),

    #[error("Robot unreachable at {endpoint}: {reason}")]
    Unreachable { endpoint: String, reason: String },

    #[error("Player {name} is penalized for another {remaining_ms}ms")]
    Penalized { name: String, remaining_ms: u64 },

    #[error("Robot does not implement command: {0}")]
    NotImplemented(String),

    #[error("Robot internal error: {0}")]
    RobotInternalError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, DispatchError>;
