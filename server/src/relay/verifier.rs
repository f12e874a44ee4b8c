//! Command-level auth seam

use crate::registry::PlayerInfo;
use arena_shared::Command;

/// Decides whether a command's `auth` token may be relayed for a player.
///
/// The token is agreed between a client and its robot; integrations that
/// know the scheme can reject commands before they reach the robot.
pub trait CommandVerifier: Send + Sync {
    fn verify(&self, player: &PlayerInfo, command: &Command) -> bool;
}

/// Leaves command auth entirely to the robot, which answers 403 on mismatch
#[derive(Debug, Clone, Copy, Default)]
pub struct RobotSideVerifier;

impl CommandVerifier for RobotSideVerifier {
    fn verify(&self, _player: &PlayerInfo, _command: &Command) -> bool {
        true
    }
}
