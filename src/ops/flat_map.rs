//! # FlatMap: map each value to an inner sequence and merge the inners.
//!
//! ```text
//! outer ──next(v)──► active < limit ? ── yes ──► mapper.apply(v) ──► subscribe inner
//!                                    └─ no  ──► pending.push_back(v)
//!
//! inner complete ──► pending.pop_front() ? start it in the freed slot
//!                                        : active -= 1
//!
//! complete when: outer done && pending empty && active == 0
//! ```
//!
//! ## Rules
//! - `concurrency == 0` means unbounded
//! - Inner values are forwarded in arrival order through the downstream gate
//! - Outer error, inner error and mapping fault all fail the whole operator
//!   once; the downstream token then cancels the outer and every active inner
//! - Values delivered before a fault stay delivered

use std::collections::VecDeque;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::SequenceError;
use crate::observers::Observer;
use crate::sequence::{Emitter, Sequence};

/// Maps an outer value to the inner sequence it expands into.
///
/// Implemented for every `Fn(T) -> Sequence<R>`; wrap a fallible closure in
/// [`Fallible`] to report mapping faults.
pub trait FlatMapFn<T, R>: Send + Sync + 'static {
    /// Produces the inner sequence for `value`.
    fn apply(&self, value: T) -> Result<Sequence<R>, SequenceError>;
}

impl<T, R, F> FlatMapFn<T, R> for F
where
    F: Fn(T) -> Sequence<R> + Send + Sync + 'static,
{
    fn apply(&self, value: T) -> Result<Sequence<R>, SequenceError> {
        Ok(self(value))
    }
}

/// Adapter turning `Fn(T) -> Result<Sequence<R>, SequenceError>` into a [`FlatMapFn`].
pub struct Fallible<F>(pub F);

impl<T, R, F> FlatMapFn<T, R> for Fallible<F>
where
    F: Fn(T) -> Result<Sequence<R>, SequenceError> + Send + Sync + 'static,
{
    fn apply(&self, value: T) -> Result<Sequence<R>, SequenceError> {
        (self.0)(value)
    }
}

struct Slots<T> {
    active: usize,
    pending: VecDeque<T>,
    outer_done: bool,
}

/// State of one flat_map subscription.
struct FlatMapRun<T, R> {
    downstream: Emitter<R>,
    mapper: Arc<dyn FlatMapFn<T, R>>,
    limit: Option<usize>,
    slots: Mutex<Slots<T>>,
}

impl<T, R> FlatMapRun<T, R>
where
    T: Send + 'static,
    R: Send + 'static,
{
    fn slots(&self) -> MutexGuard<'_, Slots<T>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn admit(self: &Arc<Self>, value: T) {
        let admitted = {
            let mut slots = self.slots();
            if self.limit.is_some_and(|limit| slots.active >= limit) {
                slots.pending.push_back(value);
                None
            } else {
                slots.active += 1;
                Some(value)
            }
        };
        if let Some(value) = admitted {
            self.start(value);
        }
    }

    /// Maps `value` and subscribes its inner; the slot is already counted.
    fn start(self: &Arc<Self>, value: T) {
        if self.downstream.is_closed() {
            return;
        }
        let mapper = &self.mapper;
        let inner = match catch_unwind(AssertUnwindSafe(|| mapper.apply(value))) {
            Ok(Ok(inner)) => inner,
            Ok(Err(err)) => return self.downstream.error(err),
            Err(panic) => return self.downstream.error(SequenceError::from_panic(panic)),
        };
        inner.subscribe_emitter(self.downstream.derive(InnerObserver {
            run: Arc::clone(self),
        }));
    }

    fn inner_completed(self: &Arc<Self>) {
        let (next, finish) = {
            let mut slots = self.slots();
            match slots.pending.pop_front() {
                Some(value) => (Some(value), false),
                None => {
                    slots.active -= 1;
                    (None, slots.outer_done && slots.active == 0)
                }
            }
        };
        if let Some(value) = next {
            self.start(value);
        } else if finish {
            self.downstream.complete();
        }
    }

    fn outer_completed(&self) {
        let finish = {
            let mut slots = self.slots();
            slots.outer_done = true;
            slots.active == 0 && slots.pending.is_empty()
        };
        if finish {
            self.downstream.complete();
        }
    }
}

struct OuterObserver<T, R> {
    run: Arc<FlatMapRun<T, R>>,
}

impl<T: Send + 'static, R: Send + 'static> Observer<T> for OuterObserver<T, R> {
    fn on_next(&mut self, value: T) {
        self.run.admit(value);
    }

    fn on_error(&mut self, error: SequenceError) {
        self.run.downstream.error(error);
    }

    fn on_complete(&mut self) {
        self.run.outer_completed();
    }
}

struct InnerObserver<T, R> {
    run: Arc<FlatMapRun<T, R>>,
}

impl<T: Send + 'static, R: Send + 'static> Observer<R> for InnerObserver<T, R> {
    fn on_next(&mut self, value: R) {
        self.run.downstream.next(value);
    }

    fn on_error(&mut self, error: SequenceError) {
        self.run.downstream.error(error);
    }

    fn on_complete(&mut self) {
        self.run.inner_completed();
    }
}

impl<T: Send + 'static> Sequence<T> {
    /// Expands every value into an inner sequence, all inners running at once.
    ///
    /// # Example
    /// ```
    /// use flowseq::Sequence;
    ///
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() {
    /// let doubled = Sequence::from_values([1, 2]).flat_map(|v: i32| Sequence::from_values([v, v]));
    /// assert_eq!(doubled.collect().await.unwrap(), [1, 1, 2, 2]);
    /// # }
    /// ```
    pub fn flat_map<R, F>(&self, mapper: F) -> Sequence<R>
    where
        R: Send + 'static,
        F: FlatMapFn<T, R>,
    {
        self.flat_map_with(mapper, 0)
    }

    /// Like [`Sequence::flat_map`] with a fallible mapper; an `Err` fails the run.
    pub fn try_flat_map<R, F>(&self, mapper: F) -> Sequence<R>
    where
        R: Send + 'static,
        F: Fn(T) -> Result<Sequence<R>, SequenceError> + Send + Sync + 'static,
    {
        self.flat_map_with(Fallible(mapper), 0)
    }

    /// Expands values with at most `concurrency` inners subscribed at a time.
    ///
    /// Values arriving while the limit is reached wait in arrival order.
    /// `0` means unbounded.
    pub fn flat_map_with<R, F>(&self, mapper: F, concurrency: usize) -> Sequence<R>
    where
        R: Send + 'static,
        F: FlatMapFn<T, R>,
    {
        let source = self.clone();
        let mapper: Arc<dyn FlatMapFn<T, R>> = Arc::new(mapper);
        let limit = (concurrency > 0).then_some(concurrency);
        Sequence::create(move |downstream: Emitter<R>| {
            let run = Arc::new(FlatMapRun {
                downstream: downstream.clone(),
                mapper: Arc::clone(&mapper),
                limit,
                slots: Mutex::new(Slots {
                    active: 0,
                    pending: VecDeque::new(),
                    outer_done: false,
                }),
            });
            source.subscribe_emitter(downstream.derive(OuterObserver { run }));
        })
    }
}
