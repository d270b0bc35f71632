//! Process wiring: tracing setup and the [`SniperSystem`] that owns the controller actor.

pub mod system;
pub mod tracing;

pub use system::*;
pub use tracing::*;
