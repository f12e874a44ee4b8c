//! Bonus ledger
//!
//! Bonuses are granted by game logic; they are only spent by the penalty
//! clock so the absorb-or-apply decision stays atomic.

use crate::error::{DispatchError, Result};
use crate::registry::Registry;
use std::sync::Arc;
use tracing::info;

pub struct BonusLedger {
    registry: Arc<Registry>,
}

impl BonusLedger {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    /// Grant `count` bonuses and return the new total
    pub async fn add_bonus(&self, name: &str, count: u32) -> Result<u32> {
        if count == 0 {
            return Err(DispatchError::ValidationError("bonus count must be at least 1".into()));
        }

        let total = self
            .registry
            .with_player(name, |player| player.penalty.add_bonus(count))
            .await?;
        info!(player = name, count, total, "bonus granted");
        Ok(total)
    }

    pub async fn get_bonus(&self, name: &str) -> Result<u32> {
        self.registry
            .with_player(name, |player| player.penalty.bonus())
            .await
    }
}
