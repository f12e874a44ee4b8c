//! Command handlers for different actions

mod status;

pub use status::StatusHandler;

use super::CommandResult;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// Context passed to command handlers
#[derive(Debug, Clone)]
pub struct HandlerContext {
    pub robot_id: String,
    pub uptime_ms: u64,
    pub commands_executed: u64,
}

/// Executes one `action` of the robot's command vocabulary
#[async_trait]
pub trait CommandHandler: Send + Sync {
    /// Value of `payload.action` this handler serves
    fn action(&self) -> &'static str;

    async fn handle(&self, ctx: &HandlerContext, payload: &Map<String, Value>) -> CommandResult;
}
