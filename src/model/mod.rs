//! Plain data structures shared by the scanner, the pipeline and the controller.
//!
//! Everything here is a DTO: wire shapes for the OVH order API, the task definition
//! loaded from the saved bundle, and the log events a run emits.

pub mod availability;
pub mod cart;
pub mod credentials;
pub mod log;
pub mod task;

pub use availability::*;
pub use cart::*;
pub use credentials::*;
pub use log::*;
pub use task::*;
