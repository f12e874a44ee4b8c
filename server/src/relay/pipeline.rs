//! Command relay pipeline

use super::verifier::CommandVerifier;
use crate::error::{DispatchError, Result};
use crate::penalty::PenaltyClock;
use crate::robot::{RobotClient, RobotError};
use arena_shared::codec::CodecError;
use arena_shared::{Command, RobotEndpoint};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Relays player commands to their robots
pub struct CommandRelay {
    penalties: Arc<PenaltyClock>,
    robots: Arc<dyn RobotClient>,
    verifier: Arc<dyn CommandVerifier>,
    timeout: Duration,
    relay_id: AtomicU64,
}

impl CommandRelay {
    pub fn new(
        penalties: Arc<PenaltyClock>,
        robots: Arc<dyn RobotClient>,
        verifier: Arc<dyn CommandVerifier>,
        timeout: Duration,
    ) -> Self {
        Self {
            penalties,
            robots,
            verifier,
            timeout,
            relay_id: AtomicU64::new(0),
        }
    }

    fn next_relay_id(&self) -> u64 {
        self.relay_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Validate and forward a command to the player's robot.
    ///
    /// Fails fast, in order: unknown player, rejected command auth, active
    /// penalty window. Only then is the robot contacted. Nothing is retried.
    pub async fn send_command(&self, name: &str, command: &Command) -> Result<Value> {
        // The player lock is released before the outbound call
        let snapshot = self.penalties.snapshot(name).await?;

        if !self.verifier.verify(&snapshot.player, command) {
            warn!(player = name, "command auth rejected");
            return Err(DispatchError::AuthFailed(name.to_string()));
        }

        if snapshot.remaining_ms > 0 {
            debug!(player = name, remaining_ms = snapshot.remaining_ms, "command dropped: penalized");
            return Err(DispatchError::Penalized {
                name: name.to_string(),
                remaining_ms: snapshot.remaining_ms,
            });
        }

        let endpoint = snapshot.player.endpoint;
        let relay_id = self.next_relay_id();

        let reply = match timeout(self.timeout, self.robots.control(&endpoint, command)).await {
            Ok(reply) => reply,
            Err(_) => Err(RobotError::Timeout(self.timeout)),
        };

        match reply {
            Ok(result) => {
                info!(player = name, relay_id, robot = %endpoint, "command relayed");
                Ok(result)
            }
            Err(e) => {
                warn!(player = name, relay_id, robot = %endpoint, error = %e, "command relay failed");
                Err(map_robot_error(name, &endpoint, e))
            }
        }
    }
}

fn map_robot_error(name: &str, endpoint: &RobotEndpoint, error: RobotError) -> DispatchError {
    match error {
        RobotError::Transport(reason) => DispatchError::Unreachable {
            endpoint: endpoint.to_string(),
            reason,
        },
        RobotError::Timeout(after) => DispatchError::Unreachable {
            endpoint: endpoint.to_string(),
            reason: format!("no reply within {:?}", after),
        },
        RobotError::Reply(CodecError::AuthFailed) => DispatchError::AuthFailed(name.to_string()),
        RobotError::Reply(CodecError::NotImplemented(detail)) => DispatchError::NotImplemented(detail),
        RobotError::Reply(CodecError::SchemaError(detail)) => DispatchError::ValidationError(detail),
        RobotError::Reply(CodecError::InternalError(detail)) => DispatchError::RobotInternalError(detail),
        RobotError::Reply(other) => DispatchError::RobotInternalError(other.to_string()),
    }
}
