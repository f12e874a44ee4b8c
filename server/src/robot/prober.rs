//! Liveness prober used at first registration

use super::client::RobotClient;
use arena_shared::RobotEndpoint;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Outcome of a liveness probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Liveness {
    Reachable,
    Unreachable { reason: String },
}

/// Issues bounded health checks against candidate robot endpoints
#[derive(Clone)]
pub struct LivenessProber {
    client: Arc<dyn RobotClient>,
    timeout: Duration,
}

impl LivenessProber {
    pub fn new(client: Arc<dyn RobotClient>, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Ping the robot at `endpoint`; a timeout counts as unreachable
    pub async fn probe(&self, endpoint: &RobotEndpoint) -> Liveness {
        match timeout(self.timeout, self.client.ping(endpoint)).await {
            Ok(Ok(())) => {
                debug!(%endpoint, client = self.client.name(), "robot reachable");
                Liveness::Reachable
            }
            Ok(Err(e)) => {
                warn!(%endpoint, error = %e, "robot probe failed");
                Liveness::Unreachable {
                    reason: e.to_string(),
                }
            }
            Err(_) => {
                let timeout_ms = self.timeout.as_millis() as u64;
                warn!(%endpoint, timeout_ms, "robot probe timed out");
                Liveness::Unreachable {
                    reason: format!("no reply within {:?}", self.timeout),
                }
            }
        }
    }
}
