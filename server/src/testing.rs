//! In-process robot double for unit tests

use crate::robot::{RobotClient, RobotError};
use arena_shared::codec;
use arena_shared::{Command, RobotEndpoint};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, AtomicU16, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Robot that counts calls and answers with a configurable status
pub(crate) struct MockRobot {
    reachable: AtomicBool,
    control_status: AtomicU16,
    ping_delay_ms: AtomicU64,
    pings: AtomicUsize,
    controls: AtomicUsize,
}

impl MockRobot {
    pub(crate) fn reachable() -> Arc<Self> {
        Arc::new(Self {
            reachable: AtomicBool::new(true),
            control_status: AtomicU16::new(200),
            ping_delay_ms: AtomicU64::new(0),
            pings: AtomicUsize::new(0),
            controls: AtomicUsize::new(0),
        })
    }

    pub(crate) fn unreachable() -> Arc<Self> {
        let robot = Self::reachable();
        robot.set_reachable(false);
        robot
    }

    pub(crate) fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }

    pub(crate) fn set_control_status(&self, status: u16) {
        self.control_status.store(status, Ordering::SeqCst);
    }

    /// Hold every ping for `delay` before answering
    pub(crate) fn set_ping_delay(&self, delay: Duration) {
        self.ping_delay_ms.store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    pub(crate) fn pings(&self) -> usize {
        self.pings.load(Ordering::SeqCst)
    }

    pub(crate) fn controls(&self) -> usize {
        self.controls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RobotClient for MockRobot {
    async fn ping(&self, _endpoint: &RobotEndpoint) -> Result<(), RobotError> {
        self.pings.fetch_add(1, Ordering::SeqCst);
        let delay_ms = self.ping_delay_ms.load(Ordering::SeqCst);
        if delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        }
        if !self.reachable.load(Ordering::SeqCst) {
            return Err(RobotError::Transport("connection refused".into()));
        }
        Ok(())
    }

    async fn control(&self, _endpoint: &RobotEndpoint, command: &Command) -> Result<Value, RobotError> {
        self.controls.fetch_add(1, Ordering::SeqCst);
        if !self.reachable.load(Ordering::SeqCst) {
            return Err(RobotError::Transport("connection refused".into()));
        }

        let status = self.control_status.load(Ordering::SeqCst);
        if status == 200 {
            return Ok(json!({"executed": command.payload}));
        }
        Ok(codec::decode_control_reply(status, b"mock failure")?)
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
