//! Player registry
//!
//! This module handles:
//! - Registering, updating and deleting players
//! - Guarding each player's state behind its own lock
//! - Read-only lookups for the penalty clock, bonus ledger and relay

mod manager;
mod player;

pub use manager::{Registration, Registry};
pub use player::{Player, PlayerInfo};
