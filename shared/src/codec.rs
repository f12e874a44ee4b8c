//! Robot reply codec
//!
//! Robots answer the dispatcher over plain HTTP. This module turns a
//! `(status, body)` pair into either the robot's JSON result or a typed
//! error, following the robot surface contract:
//! ```text
//! 200 executed | 403 auth failed | 422 schema error | 500 internal error | 501 not implemented
//! ```

use serde_json::Value;
use thiserror::Error;

use crate::{ErrorBody, PingResponse};

/// Maximum reply size accepted from a robot (1 MB)
pub const MAX_REPLY_SIZE: usize = 1024 * 1024;

/// Longest error detail kept from a robot reply
const MAX_DETAIL_LEN: usize = 256;

/// Status codes defined by the robot surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RobotStatus {
    Executed,
    AuthFailed,
    SchemaError,
    InternalError,
    NotImplemented,
    Unexpected(u16),
}

impl RobotStatus {
    pub fn from_code(code: u16) -> Self {
        match code {
            200 => RobotStatus::Executed,
            403 => RobotStatus::AuthFailed,
            422 => RobotStatus::SchemaError,
            500 => RobotStatus::InternalError,
            501 => RobotStatus::NotImplemented,
            other => RobotStatus::Unexpected(other),
        }
    }

    pub fn code(&self) -> u16 {
        match self {
            RobotStatus::Executed => 200,
            RobotStatus::AuthFailed => 403,
            RobotStatus::SchemaError => 422,
            RobotStatus::InternalError => 500,
            RobotStatus::NotImplemented => 501,
            RobotStatus::Unexpected(code) => *code,
        }
    }
}

/// Errors decoded from a robot reply
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CodecError {
    #[error("Robot rejected command auth")]
    AuthFailed,

    #[error("Robot rejected command schema: {0}")]
    SchemaError(String),

    #[error("Robot internal error: {0}")]
    InternalError(String),

    #[error("Robot does not implement command: {0}")]
    NotImplemented(String),

    #[error("Unexpected robot status {status}: {detail}")]
    UnexpectedStatus { status: u16, detail: String },

    #[error("Invalid ping reply: {0}")]
    InvalidPing(String),

    #[error("Reply too large: {0} bytes (max: {MAX_REPLY_SIZE})")]
    ReplyTooLarge(usize),
}

/// Decode the reply to `POST /robot/control`
///
/// A successful reply is passed through as JSON. An empty body decodes to
/// `null` and a non-JSON body to a JSON string.
pub fn decode_control_reply(status: u16, body: &[u8]) -> Result<Value, CodecError> {
    if body.len() > MAX_REPLY_SIZE {
        return Err(CodecError::ReplyTooLarge(body.len()));
    }

    match RobotStatus::from_code(status) {
        RobotStatus::Executed => Ok(decode_result(body)),
        RobotStatus::AuthFailed => Err(CodecError::AuthFailed),
        RobotStatus::SchemaError => Err(CodecError::SchemaError(detail(body))),
        RobotStatus::InternalError => Err(CodecError::InternalError(detail(body))),
        RobotStatus::NotImplemented => Err(CodecError::NotImplemented(detail(body))),
        RobotStatus::Unexpected(status) => Err(CodecError::UnexpectedStatus {
            status,
            detail: detail(body),
        }),
    }
}

/// Decode the reply to `GET /robot/ping`; only `200 {"pong": true}` is alive
pub fn decode_ping_reply(status: u16, body: &[u8]) -> Result<(), CodecError> {
    if body.len() > MAX_REPLY_SIZE {
        return Err(CodecError::ReplyTooLarge(body.len()));
    }
    if status != 200 {
        return Err(CodecError::InvalidPing(format!("status {}", status)));
    }

    match serde_json::from_slice::<PingResponse>(body) {
        Ok(PingResponse { pong: true }) => Ok(()),
        Ok(PingResponse { pong: false }) => Err(CodecError::InvalidPing("pong is false".into())),
        Err(e) => Err(CodecError::InvalidPing(e.to_string())),
    }
}

fn decode_result(body: &[u8]) -> Value {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Value::Null;
    }
    serde_json::from_slice(body)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(body).into_owned()))
}

/// Best-effort error detail: `{"error": ..}`, FastAPI-style `{"detail": ..}`, or raw text
fn detail(body: &[u8]) -> String {
    let text = if let Ok(err) = serde_json::from_slice::<ErrorBody>(body) {
        err.error
    } else if let Ok(Value::Object(map)) = serde_json::from_slice::<Value>(body) {
        match map.get("detail") {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => Value::Object(map).to_string(),
        }
    } else {
        String::from_utf8_lossy(body).trim().to_string()
    };

    text.chars().take(MAX_DETAIL_LEN).collect()
}
