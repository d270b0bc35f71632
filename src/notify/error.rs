use crate::cancel::Cancelled;
use thiserror::Error;

/// Errors from delivering a chat message.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification was cancelled")]
    Cancelled,

    #[error("Telegram rejected the message ({status}): {body}")]
    Status { status: u16, body: String },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl From<Cancelled> for NotifyError {
    fn from(_: Cancelled) -> Self {
        NotifyError::Cancelled
    }
}
