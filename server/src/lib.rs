//! Robot Arena Dispatcher
//!
//! Central server every player connects to. It keeps the player registry,
//! decides penalties against each player's bonus counter, and relays
//! commands to player robots while they are not muted.

pub mod bonus;
pub mod clock;
pub mod config;
pub mod error;
pub mod http;
pub mod penalty;
pub mod registry;
pub mod relay;
pub mod robot;
pub mod service;

#[cfg(test)]
mod testing;

pub use error::{DispatchError, Result};
pub use service::Dispatcher;
