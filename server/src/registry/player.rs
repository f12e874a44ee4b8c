//! Per-player record held by the registry

use arena_shared::state_machine::PenaltyState;
use arena_shared::{secrets_match, RobotEndpoint};

/// A registered player and everything the dispatcher knows about it
#[derive(Debug, Clone)]
pub struct Player {
    pub name: String,
    pub endpoint: RobotEndpoint,
    secret: String,
    pub penalty: PenaltyState,
}

impl Player {
    /// Create a player with a fresh bonus and penalty state
    pub fn new(name: impl Into<String>, endpoint: RobotEndpoint, secret: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            endpoint,
            secret: secret.into(),
            penalty: PenaltyState::new(),
        }
    }

    /// Compare `auth` against the registration secret
    pub fn check_secret(&self, auth: &str) -> bool {
        secrets_match(&self.secret, auth)
    }

    /// Snapshot for callers outside the player lock
    pub fn info(&self) -> PlayerInfo {
        PlayerInfo {
            name: self.name.clone(),
            endpoint: self.endpoint.clone(),
            auth: self.secret.clone(),
            bonus: self.penalty.bonus(),
            muted_until_ms: self.penalty.muted_until_ms(),
        }
    }
}

/// Player state as seen by readers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerInfo {
    pub name: String,
    pub endpoint: RobotEndpoint,
    pub auth: String,
    pub bonus: u32,
    pub muted_until_ms: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_secret() {
        let player = Player::new("alice", RobotEndpoint::new("10.0.0.2", 8001), "s3cret");
        assert!(player.check_secret("s3cret"));
        assert!(!player.check_secret("s3cre7"));
        assert!(!player.check_secret("s3cret-longer"));
        assert!(!player.check_secret(""));
    }

    #[test]
    fn test_info_snapshot() {
        let mut player = Player::new("bob", RobotEndpoint::new("10.0.0.3", 9000), "pw");
        player.penalty.add_bonus(2);

        let info = player.info();
        assert_eq!(info.name, "bob");
        assert_eq!(info.endpoint, RobotEndpoint::new("10.0.0.3", 9000));
        assert_eq!(info.auth, "pw");
        assert_eq!(info.bonus, 2);
        assert_eq!(info.muted_until_ms, None);
    }
}
