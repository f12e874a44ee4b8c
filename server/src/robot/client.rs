//! Robot client abstraction for pluggable robot backends

use arena_shared::codec::{self, CodecError, MAX_REPLY_SIZE};
use arena_shared::{Command, RobotEndpoint};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Failures talking to a robot
#[derive(Error, Debug)]
pub enum RobotError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error(transparent)]
    Reply(#[from] CodecError),
}

/// Client for the robot surface (`/robot/ping`, `/robot/control`)
#[async_trait]
pub trait RobotClient: Send + Sync {
    /// Health check; `Ok` only for `200 {"pong": true}`
    async fn ping(&self, endpoint: &RobotEndpoint) -> Result<(), RobotError>;

    /// Forward a command and return the robot's JSON result
    async fn control(&self, endpoint: &RobotEndpoint, command: &Command) -> Result<Value, RobotError>;

    /// Human-readable name for this client
    fn name(&self) -> &'static str;
}

/// HTTP robot client built on reqwest
#[derive(Debug, Clone)]
pub struct HttpRobotClient {
    http: reqwest::Client,
}

impl HttpRobotClient {
    /// Create a client whose connection attempts give up after `connect_timeout`
    pub fn new(connect_timeout: Duration) -> Result<Self, RobotError> {
        let http = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| RobotError::Transport(e.to_string()))?;
        Ok(Self { http })
    }
}

fn transport_error(e: reqwest::Error) -> RobotError {
    RobotError::Transport(e.to_string())
}

/// Read a reply body, giving up as soon as it exceeds `MAX_REPLY_SIZE`
async fn read_body(mut response: reqwest::Response) -> Result<Vec<u8>, RobotError> {
    if let Some(content_length) = response.content_length() {
        if content_length > MAX_REPLY_SIZE as u64 {
            return Err(CodecError::ReplyTooLarge(content_length as usize).into());
        }
    }

    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await.map_err(transport_error)? {
        if body.len() + chunk.len() > MAX_REPLY_SIZE {
            return Err(CodecError::ReplyTooLarge(body.len() + chunk.len()).into());
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}

#[async_trait]
impl RobotClient for HttpRobotClient {
    async fn ping(&self, endpoint: &RobotEndpoint) -> Result<(), RobotError> {
        let response = self
            .http
            .get(endpoint.ping_url())
            .send()
            .await
            .map_err(transport_error)?;
        let status = response.status().as_u16();
        let body = read_body(response).await?;

        codec::decode_ping_reply(status, &body)?;
        Ok(())
    }

    async fn control(&self, endpoint: &RobotEndpoint, command: &Command) -> Result<Value, RobotError> {
        let response = self
            .http
            .post(endpoint.control_url())
            .json(command)
            .send()
            .await
            .map_err(transport_error)?;
        let status = response.status().as_u16();
        let body = read_body(response).await?;

        Ok(codec::decode_control_reply(status, &body)?)
    }

    fn name(&self) -> &'static str {
        "HTTP"
    }
}
