//! # Merge: interleave several sequences in arrival order.
//!
//! ```text
//!            ┌─► branch A (derived emitter) ─┐
//! downstream ┼─► branch B (derived emitter) ─┼─► downstream.next   (serialized by its gate)
//!            └─► ...                         ┘
//!
//! branch complete ──► remaining -= 1 ──► 0 ? downstream.complete
//! branch error    ──► downstream.error ──► token tree cancels every sibling
//! ```
//!
//! The downstream emitter's latch is the single terminal writer for all
//! branches.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::SequenceError;
use crate::observers::Observer;
use crate::sequence::{Emitter, Sequence};

struct BranchObserver<T> {
    downstream: Emitter<T>,
    remaining: Arc<AtomicUsize>,
}

impl<T: Send + 'static> Observer<T> for BranchObserver<T> {
    fn on_next(&mut self, value: T) {
        self.downstream.next(value);
    }

    fn on_error(&mut self, error: SequenceError) {
        self.downstream.error(error);
    }

    fn on_complete(&mut self) {
        if self.remaining.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.downstream.complete();
        }
    }
}

/// Merges two sequences; see [`merge_all`].
pub fn merge<T: Send + 'static>(a: &Sequence<T>, b: &Sequence<T>) -> Sequence<T> {
    merge_all([a.clone(), b.clone()])
}

/// Subscribes to every input at once and forwards values as they arrive.
///
/// Completes after every input completed; the first error is forwarded and
/// the other inputs are cancelled. No inputs completes immediately.
pub fn merge_all<T, I>(sources: I) -> Sequence<T>
where
    T: Send + 'static,
    I: IntoIterator<Item = Sequence<T>>,
{
    let sources: Arc<[Sequence<T>]> = sources.into_iter().collect();
    Sequence::create(move |downstream: Emitter<T>| {
        if sources.is_empty() {
            return downstream.complete();
        }
        let remaining = Arc::new(AtomicUsize::new(sources.len()));
        for source in sources.iter() {
            if downstream.is_closed() {
                break;
            }
            source.subscribe_emitter(downstream.derive(BranchObserver {
                downstream: downstream.clone(),
                remaining: Arc::clone(&remaining),
            }));
        }
    })
}

impl<T: Send + 'static> Sequence<T> {
    /// Merges `self` with `other`.
    pub fn merge_with(&self, other: &Sequence<T>) -> Sequence<T> {
        merge(self, other)
    }
}
