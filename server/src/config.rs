//! Dispatcher configuration

use arena_shared::timing;
use clap::Parser;
use std::time::Duration;

/// Command-line arguments of the dispatcher binary
#[derive(Parser, Debug, Clone)]
#[command(name = "arena-dispatcher", about = "Robot arena dispatcher: player registry, penalties and command relay")]
pub struct Args {
    /// Address the HTTP API listens on
    #[arg(long, default_value = timing::DISPATCHER_LISTEN)]
    pub listen: String,

    /// Length of a penalty window in milliseconds
    #[arg(long, default_value_t = timing::PENALTY_WINDOW_MS)]
    pub penalty_window_ms: u64,

    /// Timeout of the liveness probe at first registration
    #[arg(long, default_value_t = timing::PROBE_TIMEOUT_MS)]
    pub probe_timeout_ms: u64,

    /// Timeout for relaying a command to a robot
    #[arg(long, default_value_t = timing::RELAY_TIMEOUT_MS)]
    pub relay_timeout_ms: u64,
}

/// Runtime configuration of the dispatcher
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// HTTP listen address
    pub listen: String,
    /// Mute duration after an applied penalty
    pub penalty_window: Duration,
    /// Liveness probe timeout
    pub probe_timeout: Duration,
    /// Command relay timeout (a timeout is reported as unreachable)
    pub relay_timeout: Duration,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            listen: timing::DISPATCHER_LISTEN.into(),
            penalty_window: Duration::from_millis(timing::PENALTY_WINDOW_MS),
            probe_timeout: Duration::from_millis(timing::PROBE_TIMEOUT_MS),
            relay_timeout: Duration::from_millis(timing::RELAY_TIMEOUT_MS),
        }
    }
}

impl From<Args> for DispatcherConfig {
    fn from(args: Args) -> Self {
        Self {
            listen: args.listen,
            penalty_window: Duration::from_millis(args.penalty_window_ms),
            probe_timeout: Duration::from_millis(args.probe_timeout_ms),
            relay_timeout: Duration::from_millis(args.relay_timeout_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_args() {
        let args = Args::parse_from(["arena-dispatcher"]);
        let from_args = DispatcherConfig::from(args);
        let default = DispatcherConfig::default();

        assert_eq!(from_args.listen, default.listen);
        assert_eq!(from_args.penalty_window, Duration::from_secs(3));
        assert_eq!(from_args.probe_timeout, default.probe_timeout);
        assert_eq!(from_args.relay_timeout, default.relay_timeout);
    }

    #[test]
    fn test_overrides() {
        let args = Args::parse_from([
            "arena-dispatcher",
            "--listen",
            "127.0.0.1:9100",
            "--penalty-window-ms",
            "500",
        ]);
        let config = DispatcherConfig::from(args);
        assert_eq!(config.listen, "127.0.0.1:9100");
        assert_eq!(config.penalty_window, Duration::from_millis(500));
    }
}
