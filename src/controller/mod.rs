//! # Task Controller
//!
//! Owns the run lifecycle: at most one run in flight, a fresh [`CancellationToken`]
//! per run, and a `stop` that reaches a run while it is suspended on the network.
//!
//! ## Shape
//!
//! The controller is an actor. [`TaskActor`] is a Tokio task holding the active-run
//! state; [`TaskController`] is the cloneable handle that sends it requests over an
//! `mpsc` channel and waits on a `oneshot` for the answer.
//!
//! ```text
//! TaskController::start ──Start──▶ TaskActor ──spawn──▶ run task
//!                                      ▲                   │ scan → pipeline → notify
//! TaskController::stop  ──Stop───▶     │ token.cancel()    │
//!                                      └────Finished───────┘
//! ```
//!
//! The run task reports `Finished` to the actor before answering the caller of
//! `start`, so a `status()` issued after `start` returns always sees `Idle`.
//!
//! [`CancellationToken`]: crate::cancel::CancellationToken

pub mod actor;
pub mod client;
pub mod error;
pub mod run;

pub use actor::{Activity, Connect, TaskActor, TaskStatus};
pub use client::TaskController;
pub use error::ControlError;
pub use run::{RunOutcome, RunReport, RunRequest};

use crate::notify::Notifier;
use std::sync::Arc;
use tokio::sync::mpsc;

const BUFFER_SIZE: usize = 16;

/// Creates the controller actor and its handle. Spawn `actor.run()` to start it.
pub fn new(connect: Connect, notifier: Arc<dyn Notifier>) -> (TaskActor, TaskController) {
    let (sender, receiver) = mpsc::channel(BUFFER_SIZE);
    let actor = TaskActor::new(receiver, sender.downgrade(), connect, notifier);
    (actor, TaskController::new(sender))
}
