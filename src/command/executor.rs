//! Command executor - validates and dispatches incoming commands

use super::handlers::{CommandHandler, HandlerContext};
use arena_shared::codec::RobotStatus;
use arena_shared::{secrets_match, Command, ErrorBody};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Result of command execution
#[derive(Debug, Clone)]
pub enum CommandResult {
    /// Command executed; `result` is returned to the caller
    Completed { result: Value },
    /// Command accepted but execution failed
    Failed { message: String },
    /// Payload is malformed for this action
    Rejected { message: String },
}

/// Status and body of a `/robot/control` reply
#[derive(Debug, Clone, PartialEq)]
pub struct Execution {
    pub status: RobotStatus,
    pub body: Value,
}

impl Execution {
    fn error(status: RobotStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            body: serde_json::to_value(ErrorBody::new(message)).unwrap_or(Value::Null),
        }
    }
}

/// Executes commands relayed by the dispatcher
pub struct CommandExecutor {
    robot_id: String,
    token: String,
    started_at: Instant,
    executed: AtomicU64,
    handlers: HashMap<&'static str, Arc<dyn CommandHandler>>,
}

impl CommandExecutor {
    /// Create an executor with no handlers
    pub fn new(robot_id: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            robot_id: robot_id.into(),
            token: token.into(),
            started_at: Instant::now(),
            executed: AtomicU64::new(0),
            handlers: HashMap::new(),
        }
    }

    /// Add a handler, replacing any previous handler for the same action
    pub fn with_handler(mut self, handler: Arc<dyn CommandHandler>) -> Self {
        self.handlers.insert(handler.action(), handler);
        self
    }

    /// Number of commands that completed successfully
    pub fn executed_count(&self) -> u64 {
        self.executed.load(Ordering::SeqCst)
    }

    /// Execute a command and return the reply for the dispatcher
    pub async fn execute(&self, command: &Command) -> Execution {
        if !secrets_match(&self.token, &command.auth) {
            warn!("Command rejected: bad auth token");
            return Execution::error(RobotStatus::AuthFailed, "authentication failed");
        }

        let action = match command.action() {
            Some(action) => action,
            None => {
                return Execution::error(RobotStatus::SchemaError, "payload.action must be a string");
            }
        };

        let handler = match self.handlers.get(action) {
            Some(handler) => handler,
            None => {
                debug!(action, "No handler registered");
                return Execution::error(
                    RobotStatus::NotImplemented,
                    format!("action not implemented: {}", action),
                );
            }
        };

        let ctx = HandlerContext {
            robot_id: self.robot_id.clone(),
            uptime_ms: self.started_at.elapsed().as_millis() as u64,
            commands_executed: self.executed_count(),
        };

        match handler.handle(&ctx, &command.payload).await {
            CommandResult::Completed { result } => {
                self.executed.fetch_add(1, Ordering::SeqCst);
                info!(action, "Command completed");
                Execution {
                    status: RobotStatus::Executed,
                    body: result,
                }
            }
            CommandResult::Failed { message } => {
                warn!(action, %message, "Command failed");
                Execution::error(RobotStatus::InternalError, message)
            }
            CommandResult::Rejected { message } => {
                info!(action, %message, "Command rejected");
                Execution::error(RobotStatus::SchemaError, message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::handlers::StatusHandler;
    use async_trait::async_trait;
    use serde_json::{json, Map};

    struct Faulty;

    #[async_trait]
    impl CommandHandler for Faulty {
        fn action(&self) -> &'static str {
            "spin"
        }

        async fn handle(&self, _ctx: &HandlerContext, payload: &Map<String, Value>) -> CommandResult {
            match payload.get("turns").and_then(|v| v.as_u64()) {
                Some(_) => CommandResult::Failed {
                    message: "gyro offline".into(),
                },
                None => CommandResult::Rejected {
                    message: "turns is required".into(),
                },
            }
        }
    }

    fn executor() -> CommandExecutor {
        CommandExecutor::new("robot-7", "tok")
            .with_handler(Arc::new(StatusHandler))
            .with_handler(Arc::new(Faulty))
    }

    fn command(payload: Value, auth: &str) -> Command {
        Command::new(payload.as_object().cloned().unwrap(), auth)
    }

    #[tokio::test]
    async fn test_status_command() {
        let executor = executor();
        let execution = executor.execute(&command(json!({"action": "status"}), "tok")).await;

        assert_eq!(execution.status, RobotStatus::Executed);
        assert_eq!(execution.body["robot_id"], "robot-7");
        assert_eq!(execution.body["commands_executed"], 0);
        assert_eq!(executor.executed_count(), 1);
    }

    #[tokio::test]
    async fn test_bad_token() {
        let execution = executor().execute(&command(json!({"action": "status"}), "nope")).await;
        assert_eq!(execution.status, RobotStatus::AuthFailed);
    }

    #[tokio::test]
    async fn test_missing_action_and_unknown_action() {
        let executor = executor();

        let execution = executor.execute(&command(json!({"speed": 1}), "tok")).await;
        assert_eq!(execution.status, RobotStatus::SchemaError);

        let execution = executor.execute(&command(json!({"action": "jump"}), "tok")).await;
        assert_eq!(execution.status, RobotStatus::NotImplemented);
        assert_eq!(execution.body["error"], "action not implemented: jump");
    }

    #[tokio::test]
    async fn test_handler_failures() {
        let executor = executor();

        let execution = executor.execute(&command(json!({"action": "spin", "turns": 2}), "tok")).await;
        assert_eq!(execution.status, RobotStatus::InternalError);

        let execution = executor.execute(&command(json!({"action": "spin"}), "tok")).await;
        assert_eq!(execution.status, RobotStatus::SchemaError);
        assert_eq!(executor.executed_count(), 0);
    }
}
