//! # Cancellation
//!
//! A run owns exactly one [`CancellationToken`]. The controller is the only writer;
//! the scanner, the pipeline and the notifier only read it. `cancel()` is idempotent and
//! a cancelled token never resets, so a stopped run stays stopped.
//!
//! Two things happen with the token:
//!
//! 1. **Step boundaries** check [`CancellationToken::is_cancelled`] before issuing the
//!    next call.
//! 2. **In-flight calls** are raced against [`CancellationToken::cancelled`] through
//!    [`abortable`]. Dropping the losing future aborts the HTTP request, and the caller
//!    gets a distinguished "cancelled" error instead of a transport failure.

use std::future::Future;

pub use tokio_util::sync::CancellationToken;

/// Marker produced when the token fired before the wrapped future finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cancelled;

/// Runs `fut` until it completes or `token` is cancelled, whichever comes first.
pub async fn abortable<F, T, E>(token: &CancellationToken, fut: F) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
    E: From<Cancelled>,
{
    if token.is_cancelled() {
        return Err(Cancelled.into());
    }
    tokio::select! {
        biased;
        _ = token.cancelled() => Err(Cancelled.into()),
        result = fut => result,
    }
}
