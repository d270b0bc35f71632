use thiserror::Error;

/// Failures talking to the controller actor itself. Run failures never show up here;
/// they are reported as a [`RunOutcome`](super::RunOutcome).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ControlError {
    #[error("a purchase task is already running (run {run_id})")]
    AlreadyRunning { run_id: u64 },
    #[error("Controller actor closed")]
    ActorClosed,
    #[error("Controller actor dropped response channel")]
    ActorDropped,
}
