//! # Handle to one unit of scheduled work.
//!
//! A [`ScheduledTask`] is returned by every [`Scheduler`](crate::Scheduler)
//! method. It owns the cancellation flag of the work item; the scheduler owns
//! the work itself until it fires or is cancelled.
//!
//! ## Rules
//! - `cancel()` before the task fired → the task never runs
//! - `cancel()` after the task fired → no effect on that run
//! - `cancel()` is idempotent
//! - Periodic tasks stop arming new ticks once cancelled

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio_util::sync::CancellationToken;

/// Cancellable handle of a scheduled work item.
#[derive(Clone, Debug)]
pub struct ScheduledTask {
    token: CancellationToken,
    fired: Arc<AtomicBool>,
}

impl ScheduledTask {
    pub(crate) fn new(token: CancellationToken) -> Self {
        Self {
            token,
            fired: Arc::new(AtomicBool::new(false)),
        }
    }

    pub(crate) fn mark_fired(&self) {
        self.fired.store(true, Ordering::Release);
    }

    /// Prevents the task from firing if it has not fired yet.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Returns true once [`cancel`](Self::cancel) was called (or the owning
    /// subscription was closed).
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Returns true if the task body started at least once.
    pub fn has_fired(&self) -> bool {
        self.fired.load(Ordering::Acquire)
    }

    /// Cancellation token controlling this task.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}
