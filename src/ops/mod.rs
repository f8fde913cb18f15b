//! Operators: sources and combinators building new sequences.
//!
//! Every operator returns a new [`Sequence`]; the source is never modified.
//! Operators subscribe upstream with an emitter derived from the downstream
//! one, so cancellation and terminal signals flow through a token tree:
//!
//! ```text
//! downstream Emitter ──derive──► upstream Emitter(Relay/branch observer) ──► source
//!        ▲                                   │
//!        └──────── next / error / complete ──┘
//! ```
//!
//! ## Contents
//! - `source`: just, empty, failed, from_values, from_collection, from_lazy_source, from_iterator, range
//! - `interval`: periodic ticks
//! - `transform`: map, try_map, filter, inspect
//! - `take`: take(n)
//! - `delay`: delay_elements, delay_subscription
//! - `merge`: merge, merge_with, merge_all
//! - `flat_map`: flat_map, try_flat_map, flat_map_with
//! - `subscribe_on`: worker hand-off of the upstream subscribe call
//! - `log`: tracing tap (feature `logging`)

mod delay;
mod flat_map;
mod interval;
mod merge;
mod source;
mod subscribe_on;
mod take;
mod transform;

#[cfg(feature = "logging")]
mod log;

pub use flat_map::{Fallible, FlatMapFn};
pub use merge::{merge, merge_all};

use crate::core::Scheduler;
use crate::error::SequenceError;
use crate::observers::Observer;
use crate::sequence::{Emitter, Sequence};

/// Upstream observer forwarding terminals unchanged and values through `on_next`.
struct Relay<U, F> {
    downstream: Emitter<U>,
    on_next: F,
}

impl<T, U, F> Observer<T> for Relay<U, F>
where
    U: Send + 'static,
    F: FnMut(T) + Send + 'static,
{
    fn on_next(&mut self, value: T) {
        (self.on_next)(value)
    }

    fn on_error(&mut self, error: SequenceError) {
        self.downstream.error(error)
    }

    fn on_complete(&mut self) {
        self.downstream.complete()
    }
}

impl<T: Send + 'static> Sequence<T> {
    /// Builds a one-upstream operator.
    ///
    /// `make` runs once per subscription with the downstream emitter and returns
    /// the value handler for that run (per-run state lives in the handler).
    pub(crate) fn relay<U, M, F>(&self, make: M) -> Sequence<U>
    where
        U: Send + 'static,
        M: Fn(Emitter<U>) -> F + Send + Sync + 'static,
        F: FnMut(T) + Send + 'static,
    {
        let source = self.clone();
        Sequence::create(move |downstream: Emitter<U>| {
            let on_next = make(downstream.clone());
            let upstream = downstream.derive(Relay {
                downstream: downstream.clone(),
                on_next,
            });
            source.subscribe_emitter(upstream);
        })
    }
}

/// Scheduler for timed operators: the explicit one, or the ambient runtime's
/// resolved at subscription time.
pub(crate) fn resolve(scheduler: &Option<Scheduler>) -> Result<Scheduler, SequenceError> {
    match scheduler {
        Some(s) => Ok(s.clone()),
        None => Scheduler::try_current(),
    }
}
