//! Cancellation-aware waiting

use std::time::Duration;

use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// The wait was interrupted by its cancellation token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cancelled while waiting")]
pub struct Cancelled;

/// Sleep for `duration` unless `token` is cancelled first.
///
/// An already-cancelled token returns immediately, even for a zero duration.
pub async fn sleep_or_cancel(duration: Duration, token: &CancellationToken) -> Result<(), Cancelled> {
    tokio::select! {
        biased;
        _ = token.cancelled() => Err(Cancelled),
        _ = tokio::time::sleep(duration) => Ok(()),
    }
}
