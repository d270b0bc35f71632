//! Error types for a purchase run.

use crate::api::ApiError;
use std::fmt;
use thiserror::Error;

/// The network steps of a run, used to label failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Availability,
    CreateCart,
    AssignCart,
    AddItem,
    RequiredConfiguration,
    CartSummary,
    CheckoutInfo,
    Checkout,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::Availability => "availability check",
            Step::CreateCart => "cart creation",
            Step::AssignCart => "cart assignment",
            Step::AddItem => "adding the server to the cart",
            Step::RequiredConfiguration => "reading required configuration",
            Step::CartSummary => "reading the cart summary",
            Step::CheckoutInfo => "reading checkout information",
            Step::Checkout => "checkout",
        };
        f.write_str(name)
    }
}

/// Why a run stopped before producing an order.
///
/// Only fatal conditions live here. Non-critical failures (non-datacenter configuration
/// entries, add-on options) are logged where they happen and never become an error.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The run's token fired. Not a failure.
    #[error("run was cancelled")]
    Cancelled,

    #[error("{step} failed: {source}")]
    Step {
        step: Step,
        #[source]
        source: ApiError,
    },

    #[error("cart creation returned no cart id")]
    MissingCartId,

    #[error("adding {plan_code} to the cart returned no item id")]
    MissingItemId { plan_code: String },

    #[error("critical configuration {label} could not be applied, aborting purchase")]
    CriticalConfiguration {
        label: String,
        #[source]
        source: ApiError,
    },

    #[error("checkout returned no order")]
    EmptyCheckout,
}

impl PipelineError {
    /// Wraps an API error for `step`, keeping cancellation distinguishable.
    pub fn step(step: Step, source: ApiError) -> Self {
        if source.is_cancelled() {
            PipelineError::Cancelled
        } else {
            PipelineError::Step { step, source }
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, PipelineError::Cancelled)
    }
}
