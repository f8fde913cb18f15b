//! # Scheduler configuration.
//!
//! Provides [`Config`] centralized settings for a [`Scheduler`](crate::Scheduler).
//!
//! ## Sentinel values
//! - `max_workers = 0` → unlimited (no worker semaphore created)

use std::borrow::Cow;

/// Configuration for a [`Scheduler`](crate::Scheduler).
///
/// ## Field semantics
/// - `name`: Label attached to scheduler diagnostics (tracing fields)
/// - `max_workers`: Cap on concurrently running worker-domain tasks (`0` = unlimited)
///
/// ## Notes
/// All fields are public for flexibility. Prefer the helper accessors to avoid
/// sprinkling sentinel checks (`0`) across the codebase.
#[derive(Clone, Debug)]
pub struct Config {
    /// Human-readable scheduler name used in logs.
    pub name: Cow<'static, str>,

    /// Maximum number of worker-domain tasks running at once.
    ///
    /// - `0` = unlimited (no semaphore)
    /// - `n > 0` = at most `n` tasks handed off via `spawn` run simultaneously
    ///
    /// Timed work (`schedule`, `schedule_periodically`) is never throttled.
    pub max_workers: usize,
}

impl Config {
    /// Returns the worker limit as an `Option`.
    ///
    /// - `None` → unlimited (no semaphore)
    /// - `Some(n)` → at most `n` concurrent worker tasks
    #[inline]
    pub fn worker_limit(&self) -> Option<usize> {
        if self.max_workers == 0 {
            None
        } else {
            Some(self.max_workers)
        }
    }

    /// Returns a copy with the given name.
    pub fn with_name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = name.into();
        self
    }

    /// Returns a copy with the given worker cap.
    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers;
        self
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `name = "parallel"`
    /// - `max_workers = 0` (unlimited)
    fn default() -> Self {
        Self {
            name: Cow::Borrowed("parallel"),
            max_workers: 0,
        }
    }
}
