//! Status request handler

use super::{CommandHandler, HandlerContext};
use crate::command::CommandResult;
use async_trait::async_trait;
use serde_json::{json, Map, Value};

/// Reports robot id, uptime and executed command count
pub struct StatusHandler;

#[async_trait]
impl CommandHandler for StatusHandler {
    fn action(&self) -> &'static str {
        "status"
    }

    async fn handle(&self, ctx: &HandlerContext, _payload: &Map<String, Value>) -> CommandResult {
        CommandResult::Completed {
            result: json!({
                "robot_id": ctx.robot_id,
                "uptime_ms": ctx.uptime_ms,
                "commands_executed": ctx.commands_executed,
            }),
        }
    }
}
