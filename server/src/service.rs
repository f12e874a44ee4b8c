//! Process-wide dispatcher state
//!
//! One `Dispatcher` is built at service start and dropped at service stop.
//! Player state is only reachable through its components.

use crate::bonus::BonusLedger;
use crate::clock::Clock;
use crate::config::DispatcherConfig;
use crate::penalty::PenaltyClock;
use crate::registry::Registry;
use crate::relay::{CommandRelay, CommandVerifier, RobotSideVerifier};
use crate::robot::{LivenessProber, RobotClient};
use std::sync::Arc;

pub struct Dispatcher {
    registry: Arc<Registry>,
    penalties: Arc<PenaltyClock>,
    bonuses: BonusLedger,
    relay: CommandRelay,
}

impl Dispatcher {
    /// Build a dispatcher that leaves command auth to the robots
    pub fn new(config: &DispatcherConfig, robots: Arc<dyn RobotClient>, clock: Arc<dyn Clock>) -> Self {
        Self::with_verifier(config, robots, clock, Arc::new(RobotSideVerifier))
    }

    pub fn with_verifier(
        config: &DispatcherConfig,
        robots: Arc<dyn RobotClient>,
        clock: Arc<dyn Clock>,
        verifier: Arc<dyn CommandVerifier>,
    ) -> Self {
        let prober = LivenessProber::new(robots.clone(), config.probe_timeout);
        let registry = Arc::new(Registry::new(prober));
        let penalties = Arc::new(PenaltyClock::new(registry.clone(), clock, config.penalty_window));
        let bonuses = BonusLedger::new(registry.clone());
        let relay = CommandRelay::new(penalties.clone(), robots, verifier, config.relay_timeout);

        Self {
            registry,
            penalties,
            bonuses,
            relay,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn penalties(&self) -> &PenaltyClock {
        &self.penalties
    }

    pub fn bonuses(&self) -> &BonusLedger {
        &self.bonuses
    }

    pub fn relay(&self) -> &CommandRelay {
        &self.relay
    }
}
