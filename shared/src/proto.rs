//! JSON wire types for the dispatcher and robot HTTP surfaces

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use crate::state_machine::PenaltyOutcome;

/// A command relayed from a player's client to its robot.
///
/// `payload` is robot-specific and `auth` is a token agreed between the
/// client and its robot; the dispatcher carries both untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    pub payload: Map<String, Value>,
    pub auth: String,
}

/// Body of `GET /robot/ping`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PingResponse {
    pub pong: bool,
}

/// Query of `PUT /player/{player_name}`
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterParams {
    pub robot_address: String,
    pub robot_port: u16,
    pub auth: String,
}

/// Query carrying the registration secret
#[derive(Debug, Clone, Deserialize)]
pub struct AuthParams {
    pub auth: String,
}

/// Query of `POST /player/{player_name}/bonus`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BonusParams {
    pub count: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerNameResponse {
    pub player_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BonusResponse {
    pub bonus: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PenaltyResponse {
    pub outcome: PenaltyOutcome,
    pub bonus: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerListResponse {
    pub player_list: Vec<String>,
}

/// Error body returned by both surfaces
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_after_ms: Option<u64>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            retry_after_ms: None,
        }
    }
}
