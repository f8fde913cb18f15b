//! # Emitter: the per-subscription sink.
//!
//! Sources and operators push signals into an [`Emitter`]; the emitter hands
//! them to the subscription's [`Observer`] while enforcing the signal grammar.
//!
//! ## Architecture
//! ```text
//! source / operator ──► Emitter::next ──► [closed?] ──► gate (Mutex<observer>) ──► on_next
//!                   ──► Emitter::complete / error
//!                          └─► latch.try_close ──► gate ──► on_complete / on_error
//!                                               └─► token.cancel()  (releases timers + upstream)
//! ```
//!
//! ## Rules
//! - **Closed** = terminal latch closed **or** cancellation token cancelled
//! - The closed check runs before taking the gate and again under it
//! - Observer calls are serialized by the gate (fan-in branches never interleave a call)
//! - A terminal signal cancels the emitter's token, which cancels every upstream
//!   emitter derived from it (child tokens)

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio_util::sync::CancellationToken;

use crate::error::SequenceError;
use crate::observers::Observer;
use crate::sequence::latch::{Terminal, TerminalLatch};

struct Shared<T> {
    observer: Mutex<Box<dyn Observer<T>>>,
    latch: TerminalLatch,
    token: CancellationToken,
}

/// Sink of one subscription run.
///
/// Cheap to clone; clones share the observer, latch and token.
///
/// # Example
/// ```
/// use flowseq::Sequence;
///
/// let words = Sequence::create(|emitter| {
///     for w in ["alpha", "beta"] {
///         if !emitter.next(w.to_string()) {
///             return;
///         }
///     }
///     emitter.complete();
/// });
///
/// let seen = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
/// let sink = seen.clone();
/// words.subscribe_fn(move |w| sink.lock().unwrap().push(w));
/// assert_eq!(*seen.lock().unwrap(), vec!["alpha", "beta"]);
/// ```
pub struct Emitter<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for Emitter<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T: Send + 'static> Emitter<T> {
    /// Creates a root emitter for `observer`, controlled by `token`.
    pub(crate) fn new<O: Observer<T>>(observer: O, token: CancellationToken) -> Self {
        Self {
            shared: Arc::new(Shared {
                observer: Mutex::new(Box::new(observer)),
                latch: TerminalLatch::new(),
                token,
            }),
        }
    }

    /// Creates an upstream emitter whose token is a child of this one.
    ///
    /// Closing this emitter (terminal or cancel) cancels the derived one.
    pub(crate) fn derive<U, O>(&self, observer: O) -> Emitter<U>
    where
        U: Send + 'static,
        O: Observer<U>,
    {
        Emitter::new(observer, self.shared.token.child_token())
    }

    /// Delivers `value` unless the run is closed.
    ///
    /// Returns `false` when the value was dropped because the run is closed;
    /// sources use it to stop producing.
    pub fn next(&self, value: T) -> bool {
        if self.is_closed() {
            return false;
        }
        let mut observer = self.lock();
        if self.is_closed() {
            return false;
        }
        observer.on_next(value);
        true
    }

    /// Delivers the completion signal if no terminal signal was delivered yet.
    pub fn complete(&self) {
        if self.shared.token.is_cancelled() || !self.shared.latch.try_close(Terminal::Completed) {
            return;
        }
        let mut observer = self.lock();
        if self.shared.token.is_cancelled() {
            return;
        }
        observer.on_complete();
        drop(observer);
        self.shared.token.cancel();
    }

    /// Delivers `error` if no terminal signal was delivered yet.
    ///
    /// A lost race (already completed, errored or cancelled) drops the error.
    pub fn error(&self, error: SequenceError) {
        if self.shared.token.is_cancelled() || !self.shared.latch.try_close(Terminal::Errored) {
            tracing::debug!(label = error.as_label(), error = %error, "error dropped: run already closed");
            return;
        }
        let mut observer = self.lock();
        if self.shared.token.is_cancelled() {
            return;
        }
        observer.on_error(error);
        drop(observer);
        self.shared.token.cancel();
    }

    /// Returns true once the run terminated or was cancelled.
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.shared.latch.is_closed() || self.shared.token.is_cancelled()
    }

    /// Cancellation token of this run.
    pub fn token(&self) -> &CancellationToken {
        &self.shared.token
    }

    /// Terminal signal delivered so far, if any.
    pub fn terminal(&self) -> Option<Terminal> {
        self.shared.latch.terminal()
    }

    fn lock(&self) -> MutexGuard<'_, Box<dyn Observer<T>>> {
        self.shared
            .observer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
