//! Player Penalty State Machine
//!
//! Per-player bonus counter and mute window. Timestamps are monotonic
//! milliseconds supplied by the caller, so every query here is pure.

use serde::{Deserialize, Serialize};

/// Result of a penalty request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PenaltyOutcome {
    /// A bonus was consumed instead of muting the player
    Absorbed,
    /// The player is muted until the end of a new window
    Applied,
}

/// Bonus and penalty state of one player
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PenaltyState {
    bonus: u32,
    muted_until_ms: Option<u64>,
}

impl PenaltyState {
    /// Fresh state: no bonus, not muted
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bonus(&self) -> u32 {
        self.bonus
    }

    /// End of the most recent penalty window, if any was ever applied
    pub fn muted_until_ms(&self) -> Option<u64> {
        self.muted_until_ms
    }

    /// Add `count` bonuses and return the new total
    pub fn add_bonus(&mut self, count: u32) -> u32 {
        self.bonus = self.bonus.saturating_add(count);
        self.bonus
    }

    /// Absorb the penalty with a bonus if one is available, otherwise mute
    /// the player for `window_ms` starting at `now_ms`.
    ///
    /// A penalty applied during an active window restarts it; windows never stack.
    pub fn apply_penalty(&mut self, now_ms: u64, window_ms: u64) -> PenaltyOutcome {
        if self.bonus >= 1 {
            self.bonus -= 1;
            return PenaltyOutcome::Absorbed;
        }

        self.muted_until_ms = Some(now_ms.saturating_add(window_ms));
        PenaltyOutcome::Applied
    }

    /// True while `now_ms` is before the end of the penalty window
    pub fn is_muted(&self, now_ms: u64) -> bool {
        matches!(self.muted_until_ms, Some(end) if now_ms < end)
    }

    /// Milliseconds left in the current window (0 when not muted)
    pub fn remaining_ms(&self, now_ms: u64) -> u64 {
        self.muted_until_ms
            .map(|end| end.saturating_sub(now_ms))
            .unwrap_or(0)
    }
}
