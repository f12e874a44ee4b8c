//! Outbound calls to player robots
//!
//! This module handles:
//! - The pluggable robot client seam (HTTP in production, mocks in tests)
//! - Liveness probing of robot endpoints at first registration

mod client;
mod prober;

pub use client::{HttpRobotClient, RobotClient, RobotError};
pub use prober::{Liveness, LivenessProber};
