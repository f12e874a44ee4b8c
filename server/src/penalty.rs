//! Penalty clock
//!
//! Decides atomically, per player, whether a penalty is absorbed by a bonus
//! or mutes the player for a fixed window.

use crate::clock::Clock;
use crate::error::Result;
use crate::registry::{PlayerInfo, Registry};
use arena_shared::state_machine::PenaltyOutcome;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// What happened to a penalty request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PenaltyReport {
    pub outcome: PenaltyOutcome,
    /// Bonus left after the request
    pub bonus: u32,
    /// End of the mute window when the penalty was applied
    pub muted_until_ms: Option<u64>,
}

/// Player snapshot taken together with its mute state
#[derive(Debug, Clone)]
pub struct MuteSnapshot {
    pub player: PlayerInfo,
    pub remaining_ms: u64,
}

pub struct PenaltyClock {
    registry: Arc<Registry>,
    clock: Arc<dyn Clock>,
    window_ms: u64,
}

impl PenaltyClock {
    pub fn new(registry: Arc<Registry>, clock: Arc<dyn Clock>, window: Duration) -> Self {
        Self {
            registry,
            clock,
            window_ms: window.as_millis() as u64,
        }
    }

    /// Absorb the penalty with a bonus, or mute the player from now on
    pub async fn apply_penalty(&self, name: &str) -> Result<PenaltyReport> {
        let window_ms = self.window_ms;
        let clock = &self.clock;

        let report = self
            .registry
            .with_player(name, |player| {
                // Read the clock under the lock: the window starts when the
                // penalty is applied, not when it was requested
                let now = clock.now_ms();
                let outcome = player.penalty.apply_penalty(now, window_ms);
                PenaltyReport {
                    outcome,
                    bonus: player.penalty.bonus(),
                    muted_until_ms: match outcome {
                        PenaltyOutcome::Applied => player.penalty.muted_until_ms(),
                        PenaltyOutcome::Absorbed => None,
                    },
                }
            })
            .await?;

        match report.outcome {
            PenaltyOutcome::Absorbed => {
                info!(player = name, bonus_left = report.bonus, "penalty absorbed by bonus");
            }
            PenaltyOutcome::Applied => {
                info!(player = name, window_ms, "penalty applied");
            }
        }
        Ok(report)
    }

    /// True while the player's penalty window is open
    pub async fn is_muted(&self, name: &str) -> Result<bool> {
        let now = self.clock.now_ms();
        self.registry
            .with_player(name, |player| player.penalty.is_muted(now))
            .await
    }

    /// Snapshot a player and its remaining mute time under one lock
    pub async fn snapshot(&self, name: &str) -> Result<MuteSnapshot> {
        let clock = &self.clock;
        self.registry
            .with_player(name, |player| MuteSnapshot {
                player: player.info(),
                remaining_ms: player.penalty.remaining_ms(clock.now_ms()),
            })
            .await
    }
}
