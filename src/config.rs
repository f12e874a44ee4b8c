//! Robot node configuration

use arena_shared::timing;
use clap::Parser;

/// Command-line arguments of the robot node
#[derive(Parser, Debug, Clone)]
#[command(name = "arena-robot", about = "Reference robot node for the robot arena")]
pub struct Args {
    /// Address the robot API listens on
    #[arg(long, default_value = timing::ROBOT_LISTEN)]
    pub listen: String,

    /// Token clients must put in each command's `auth` field
    #[arg(long, default_value = "robot-token")]
    pub token: String,

    /// Identifier reported by the status command
    #[arg(long, default_value = "robot-001")]
    pub robot_id: String,
}

/// Runtime configuration of the robot node
#[derive(Debug, Clone)]
pub struct RobotConfig {
    pub listen: String,
    pub token: String,
    pub robot_id: String,
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            listen: timing::ROBOT_LISTEN.into(),
            token: "robot-token".into(),
            robot_id: "robot-001".into(),
        }
    }
}

impl From<Args> for RobotConfig {
    fn from(args: Args) -> Self {
        Self {
            listen: args.listen,
            token: args.token,
            robot_id: args.robot_id,
        }
    }
}
