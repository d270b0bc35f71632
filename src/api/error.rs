//! Error types for the order API.

use crate::cancel::Cancelled;
use thiserror::Error;

/// Errors returned by [`OrderApi`](super::OrderApi) calls.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The run's token fired while the request was in flight.
    #[error("request was cancelled")]
    Cancelled,

    /// The API answered with a non-2xx status.
    #[error("OVH API request failed ({status}): {body}")]
    Status { status: u16, body: String },

    /// Connection, TLS or body transfer failure.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The body was not the JSON shape the endpoint documents.
    #[error("invalid response: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ApiError::Cancelled)
    }
}

impl From<Cancelled> for ApiError {
    fn from(_: Cancelled) -> Self {
        ApiError::Cancelled
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Decode(e.to_string())
    }
}
