use std::fmt;

/// Position of a run in the linear purchase state machine.
///
/// `Idle → CartCreated → CartAssigned → ItemAdded → Configured → CheckoutReady → Completed`,
/// with `Failed` and `Cancelled` reachable from anywhere. The last three are absorbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PipelineState {
    Idle,
    CartCreated,
    CartAssigned,
    ItemAdded,
    Configured,
    CheckoutReady,
    Completed,
    Failed,
    Cancelled,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
