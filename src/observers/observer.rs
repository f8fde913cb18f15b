//! # Core observer trait
//!
//! `Observer` is the consumer side of a subscription. The engine calls it
//! through the subscription's [`Emitter`](crate::Emitter), which serializes
//! calls and enforces the signal grammar:
//!
//! ```text
//! on_next* (on_complete | on_error)?
//! ```
//!
//! ## Contract
//! - Calls are never concurrent for one subscription, even when upstream
//!   branches run on different workers.
//! - At most one terminal call; no `on_next` after it.
//! - After the subscription is cancelled no further calls start.
//! - Callbacks must not re-enter the emitter that is calling them.

use crate::error::SequenceError;

/// Receives the signals of one subscription.
///
/// Methods take `&mut self`: the emitter owns the observer behind a lock, so
/// implementations keep plain mutable state without their own synchronization.
pub trait Observer<T>: Send + 'static {
    /// Receives the next value.
    fn on_next(&mut self, value: T);

    /// Receives the terminal failure.
    ///
    /// The default implementation logs the error.
    fn on_error(&mut self, error: SequenceError) {
        tracing::error!(label = error.as_label(), error = %error, "unhandled sequence error");
    }

    /// Receives the terminal completion. No-op by default.
    fn on_complete(&mut self) {}
}

/// Closure-backed [`Observer`].
///
/// Built by [`Sequence::subscribe_fn`](crate::Sequence::subscribe_fn) and
/// [`Sequence::subscribe_with`](crate::Sequence::subscribe_with).
pub struct CallbackObserver<N, E, C> {
    on_next: N,
    on_error: E,
    on_complete: C,
}

impl<N> CallbackObserver<N, fn(SequenceError), fn()> {
    /// Observer that only handles values; errors are logged, completion ignored.
    pub fn new(on_next: N) -> Self {
        Self {
            on_next,
            on_error: log_error,
            on_complete: ignore,
        }
    }
}

impl<N, E, C> CallbackObserver<N, E, C> {
    /// Observer with handlers for all three signals.
    pub fn with_handlers(on_next: N, on_error: E, on_complete: C) -> Self {
        Self {
            on_next,
            on_error,
            on_complete,
        }
    }
}

impl<T, N, E, C> Observer<T> for CallbackObserver<N, E, C>
where
    N: FnMut(T) + Send + 'static,
    E: FnMut(SequenceError) + Send + 'static,
    C: FnMut() + Send + 'static,
{
    fn on_next(&mut self, value: T) {
        (self.on_next)(value)
    }

    fn on_error(&mut self, error: SequenceError) {
        (self.on_error)(error)
    }

    fn on_complete(&mut self) {
        (self.on_complete)()
    }
}

fn log_error(error: SequenceError) {
    tracing::error!(label = error.as_label(), error = %error, "unhandled sequence error");
}

fn ignore() {}
