//! Registry of all known players

use super::player::{Player, PlayerInfo};
use crate::error::{DispatchError, Result};
use crate::robot::{Liveness, LivenessProber};
use arena_shared::RobotEndpoint;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

/// Lifecycle of a per-player slot.
///
/// A slot is created `Vacant` by a first registration and stays locked while
/// the robot is probed. `Retired` slots have been removed from the map and
/// must never be reused.
#[derive(Debug)]
enum Slot {
    Vacant,
    Occupied(Player),
    Retired,
}

/// Map value: the slot behind its lock, plus a flag readable without it
#[derive(Debug)]
struct SlotCell {
    state: Mutex<Slot>,
    /// True while `state` holds `Slot::Occupied`; written under the lock
    occupied: AtomicBool,
}

impl SlotCell {
    fn vacant() -> Self {
        Self {
            state: Mutex::new(Slot::Vacant),
            occupied: AtomicBool::new(false),
        }
    }

    fn is_occupied(&self) -> bool {
        self.occupied.load(Ordering::Acquire)
    }
}

type SlotRef = Arc<SlotCell>;

/// A vacant slot claimed by a first registration.
///
/// Unless `fill` is called, dropping it retires and evicts the slot, so a
/// cancelled registration leaves nothing behind in the map.
struct Reservation<'a> {
    registry: &'a Registry,
    name: &'a str,
    cell: &'a SlotRef,
    state: MutexGuard<'a, Slot>,
    filled: bool,
}

impl Reservation<'_> {
    fn fill(mut self, player: Player) {
        *self.state = Slot::Occupied(player);
        self.cell.occupied.store(true, Ordering::Release);
        self.filled = true;
    }
}

impl Drop for Reservation<'_> {
    fn drop(&mut self) {
        if !self.filled {
            *self.state = Slot::Retired;
            self.registry.evict(self.name, self.cell);
        }
    }
}

/// Whether a successful `register` created or updated the player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    Created,
    Updated,
}

/// Manages all registered players
pub struct Registry {
    /// Map of player name -> slot
    players: DashMap<String, SlotRef>,
    prober: LivenessProber,
}

impl Registry {
    /// Create an empty registry
    pub fn new(prober: LivenessProber) -> Self {
        Self {
            players: DashMap::new(),
            prober,
        }
    }

    fn slot(&self, name: &str) -> Option<SlotRef> {
        self.players.get(name).map(|entry| entry.value().clone())
    }

    /// Drop `slot` from the map unless a newer slot already replaced it
    fn evict(&self, name: &str, slot: &SlotRef) {
        self.players.remove_if(name, |_, current| Arc::ptr_eq(current, slot));
    }

    /// Register a new player or update an existing one.
    ///
    /// A first registration probes the robot and stores `auth` as the
    /// player's secret. Later registrations must present that secret and only
    /// update the robot endpoint.
    pub async fn register(&self, name: &str, endpoint: RobotEndpoint, auth: &str) -> Result<Registration> {
        loop {
            let cell = self
                .players
                .entry(name.to_string())
                .or_insert_with(|| Arc::new(SlotCell::vacant()))
                .clone();

            let mut state = cell.state.lock().await;

            match &mut *state {
                // Deleted while we waited; pick up the fresh slot
                Slot::Retired => continue,
                Slot::Occupied(player) => {
                    if !player.check_secret(auth) {
                        warn!(player = name, "registration rejected: bad secret");
                        return Err(DispatchError::AuthFailed(name.to_string()));
                    }
                    if player.endpoint != endpoint {
                        info!(player = name, from = %player.endpoint, to = %endpoint, "robot endpoint updated");
                    }
                    player.endpoint = endpoint;
                    return Ok(Registration::Updated);
                }
                Slot::Vacant => {}
            }

            // The slot lock is held across the probe so a concurrent first
            // registration of the same name waits for the outcome
            let reservation = Reservation {
                registry: self,
                name,
                cell: &cell,
                state,
                filled: false,
            };

            return match self.prober.probe(&endpoint).await {
                Liveness::Reachable => {
                    info!(player = name, robot = %endpoint, "player registered");
                    reservation.fill(Player::new(name, endpoint, auth));
                    Ok(Registration::Created)
                }
                Liveness::Unreachable { reason } => Err(DispatchError::Unreachable {
                    endpoint: endpoint.to_string(),
                    reason,
                }),
            };
        }
    }

    /// Delete a player, forgetting its secret, bonus and penalty state
    pub async fn delete(&self, name: &str, auth: &str) -> Result<()> {
        let cell = self
            .slot(name)
            .ok_or_else(|| DispatchError::NotFound(name.to_string()))?;
        let mut state = cell.state.lock().await;

        match &*state {
            Slot::Occupied(player) if player.check_secret(auth) => {}
            Slot::Occupied(_) => {
                warn!(player = name, "deletion rejected: bad secret");
                return Err(DispatchError::AuthFailed(name.to_string()));
            }
            Slot::Vacant | Slot::Retired => {
                return Err(DispatchError::NotFound(name.to_string()));
            }
        }

        *state = Slot::Retired;
        cell.occupied.store(false, Ordering::Release);
        // Evict while still holding the lock so nobody can observe a
        // retired slot through the map after we return
        self.evict(name, &cell);
        info!(player = name, "player deleted");
        Ok(())
    }

    /// Run `f` on the player under its lock
    pub async fn with_player<R>(&self, name: &str, f: impl FnOnce(&mut Player) -> R) -> Result<R> {
        let cell = self
            .slot(name)
            .ok_or_else(|| DispatchError::NotFound(name.to_string()))?;
        let mut state = cell.state.lock().await;

        match &mut *state {
            Slot::Occupied(player) => Ok(f(player)),
            Slot::Vacant | Slot::Retired => Err(DispatchError::NotFound(name.to_string())),
        }
    }

    /// Get a snapshot of a player
    pub async fn lookup(&self, name: &str) -> Result<PlayerInfo> {
        self.with_player(name, |player| player.info()).await
    }

    /// Check `auth` against the player's registration secret
    pub async fn authenticate(&self, name: &str, auth: &str) -> Result<()> {
        let ok = self.with_player(name, |player| player.check_secret(auth)).await?;
        if ok {
            Ok(())
        } else {
            debug!(player = name, "secret mismatch");
            Err(DispatchError::AuthFailed(name.to_string()))
        }
    }

    /// Names of all registered players, sorted.
    ///
    /// Never waits on a slot lock, so an in-flight probe does not stall it.
    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .players
            .iter()
            .filter(|entry| entry.value().is_occupied())
            .map(|entry| entry.key().clone())
            .collect();
        names.sort();
        names
    }

    #[cfg(test)]
    fn slot_count(&self) -> usize {
        self.players.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockRobot;
    use std::time::Duration;

    fn registry_with(robot: Arc<MockRobot>) -> Registry {
        Registry::new(LivenessProber::new(robot, Duration::from_millis(500)))
    }

    fn endpoint(port: u16) -> RobotEndpoint {
        RobotEndpoint::new("10.0.0.9", port)
    }

    #[tokio::test]
    async fn test_register_and_lookup() {
        let robot = MockRobot::reachable();
        let registry = registry_with(robot.clone());

        let result = registry.register("alice", endpoint(8001), "pw").await;
        assert_eq!(result, Ok(Registration::Created));
        assert_eq!(robot.pings(), 1);

        let info = registry.lookup("alice").await.expect("registered");
        assert_eq!(info.endpoint, endpoint(8001));
        assert_eq!(info.auth, "pw");
        assert_eq!(info.bonus, 0);
    }

    #[tokio::test]
    async fn test_unreachable_robot_creates_nothing() {
        let robot = MockRobot::unreachable();
        let registry = registry_with(robot);

        let result = registry.register("alice", endpoint(8001), "pw").await;
        assert!(matches!(result, Err(DispatchError::Unreachable { .. })));
        assert_eq!(registry.lookup("alice").await, Err(DispatchError::NotFound("alice".into())));
        assert!(registry.list().is_empty());
        assert_eq!(registry.slot_count(), 0);
    }

    #[tokio::test]
    async fn test_update_requires_secret() {
        let robot = MockRobot::reachable();
        let registry = registry_with(robot.clone());
        registry.register("alice", endpoint(8001), "pw").await.unwrap();

        let result = registry.register("alice", endpoint(9999), "wrong").await;
        assert_eq!(result, Err(DispatchError::AuthFailed("alice".into())));
        assert_eq!(registry.lookup("alice").await.unwrap().endpoint, endpoint(8001));

        let result = registry.register("alice", endpoint(9999), "pw").await;
        assert_eq!(result, Ok(Registration::Updated));
        assert_eq!(registry.lookup("alice").await.unwrap().endpoint, endpoint(9999));
        // Updates are not re-probed
        assert_eq!(robot.pings(), 1);
    }

    #[tokio::test]
    async fn test_delete() {
        let registry = registry_with(MockRobot::reachable());
        registry.register("alice", endpoint(8001), "pw").await.unwrap();

        assert_eq!(
            registry.delete("alice", "nope").await,
            Err(DispatchError::AuthFailed("alice".into()))
        );
        assert!(registry.lookup("alice").await.is_ok());

        assert_eq!(registry.delete("alice", "pw").await, Ok(()));
        assert_eq!(registry.lookup("alice").await, Err(DispatchError::NotFound("alice".into())));
        assert_eq!(
            registry.delete("alice", "pw").await,
            Err(DispatchError::NotFound("alice".into()))
        );
    }

    #[tokio::test]
    async fn test_delete_then_register_is_fresh() {
        let robot = MockRobot::reachable();
        let registry = registry_with(robot.clone());
        registry.register("alice", endpoint(8001), "old").await.unwrap();
        registry
            .with_player("alice", |p| p.penalty.add_bonus(3))
            .await
            .unwrap();
        registry.delete("alice", "old").await.unwrap();

        let result = registry.register("alice", endpoint(8002), "new").await;
        assert_eq!(result, Ok(Registration::Created));
        assert_eq!(robot.pings(), 2);

        let info = registry.lookup("alice").await.unwrap();
        assert_eq!(info.auth, "new");
        assert_eq!(info.bonus, 0);
        assert_eq!(info.muted_until_ms, None);
        assert!(registry.authenticate("alice", "old").await.is_err());
    }

    #[tokio::test]
    async fn test_list_is_sorted() {
        let registry = registry_with(MockRobot::reachable());
        for name in ["carol", "alice", "bob"] {
            registry.register(name, endpoint(8001), "pw").await.unwrap();
        }
        registry.delete("bob", "pw").await.unwrap();

        assert_eq!(registry.list(), vec!["alice".to_string(), "carol".to_string()]);
    }

    #[tokio::test]
    async fn test_concurrent_first_registrations_serialize() {
        let robot = MockRobot::reachable();
        let registry = Arc::new(registry_with(robot.clone()));

        let tasks: Vec<_> = (0..8)
            .map(|i| {
                let registry = registry.clone();
                tokio::spawn(async move {
                    registry
                        .register("alice", endpoint(8001), &format!("secret-{}", i))
                        .await
                })
            })
            .collect();

        let mut created = 0;
        let mut rejected = 0;
        for task in tasks {
            match task.await.unwrap() {
                Ok(Registration::Created) => created += 1,
                Err(DispatchError::AuthFailed(_)) => rejected += 1,
                other => panic!("unexpected {:?}", other),
            }
        }

        assert_eq!(created, 1);
        assert_eq!(rejected, 7);
        assert_eq!(robot.pings(), 1);
    }

    #[tokio::test]
    async fn test_delete_racing_register() {
        let registry = Arc::new(registry_with(MockRobot::reachable()));
        registry.register("alice", endpoint(8001), "pw").await.unwrap();

        let deleter = {
            let registry = registry.clone();
            tokio::spawn(async move { registry.delete("alice", "pw").await })
        };
        let registrar = {
            let registry = registry.clone();
            tokio::spawn(async move { registry.register("alice", endpoint(8002), "pw2").await })
        };

        assert_eq!(deleter.await.unwrap(), Ok(()));
        let registered = registrar.await.unwrap();

        // Either the registration ran first (and was rejected, leaving the
        // delete to win) or after (and created a fresh player)
        match registered {
            Err(DispatchError::AuthFailed(_)) => {
                assert!(registry.lookup("alice").await.is_err());
            }
            Ok(Registration::Created) => {
                assert_eq!(registry.lookup("alice").await.unwrap().auth, "pw2");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_list_does_not_wait_for_pending_registration() {
        let robot = MockRobot::reachable();
        let registry = Arc::new(registry_with(robot.clone()));
        registry.register("alice", endpoint(8001), "pw").await.unwrap();

        robot.set_ping_delay(Duration::from_millis(400));
        let pending = {
            let registry = registry.clone();
            tokio::spawn(async move { registry.register("bob", endpoint(8002), "pw").await })
        };
        while robot.pings() < 2 {
            tokio::task::yield_now().await;
        }

        let names = tokio::time::timeout(Duration::from_millis(50), async { registry.list() })
            .await
            .expect("list must not wait for bob's registration");
        assert_eq!(names, vec!["alice".to_string()]);

        assert_eq!(pending.await.unwrap(), Ok(Registration::Created));
        assert_eq!(registry.list(), vec!["alice".to_string(), "bob".to_string()]);
    }

    #[tokio::test]
    async fn test_cancelled_registration_leaves_no_slot() {
        let robot = MockRobot::reachable();
        robot.set_ping_delay(Duration::from_secs(30));
        let registry = Arc::new(registry_with(robot.clone()));

        let tasks: Vec<_> = (0..20)
            .map(|i| {
                let registry = registry.clone();
                tokio::spawn(async move { registry.register(&format!("ghost{}", i), endpoint(8001), "pw").await })
            })
            .collect();
        while robot.pings() < 20 {
            tokio::task::yield_now().await;
        }
        assert_eq!(registry.slot_count(), 20);

        for task in tasks {
            task.abort();
            assert!(task.await.unwrap_err().is_cancelled());
        }

        assert_eq!(registry.slot_count(), 0);
        assert!(registry.list().is_empty());

        // The name is free again
        robot.set_ping_delay(Duration::ZERO);
        let result = registry.register("ghost0", endpoint(8001), "new").await;
        assert_eq!(result, Ok(Registration::Created));
    }
}
