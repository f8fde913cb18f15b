//! # Subscription: cancellation handle of one run.

use tokio_util::sync::CancellationToken;

/// Handle returned by [`Sequence::subscribe`](crate::Sequence::subscribe).
///
/// ### Rules
/// - `cancel()` stops further observer calls and releases the run's timers
/// - `cancel()` is idempotent, and a no-op after natural termination
/// - Dropping the handle does **not** cancel the run
#[derive(Clone, Debug)]
pub struct Subscription {
    token: CancellationToken,
}

impl Subscription {
    pub(crate) fn new(token: CancellationToken) -> Self {
        Self { token }
    }

    /// Cancels the run.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Returns true once the run completed, failed, or was cancelled.
    pub fn is_closed(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Waits until the run completed, failed, or was cancelled.
    pub async fn closed(&self) {
        self.token.cancelled().await
    }
}
