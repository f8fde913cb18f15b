//! # Time-shifting operators.
//!
//! ## delay_elements
//! ```text
//! upstream ──next──► queue (receipt order) ──► [one timer armed at a time]
//!                                              sleep(d) ──► emit head ──► re-arm if queue non-empty
//! upstream ──complete──► mark done; complete after the queue drains
//! upstream ──error─────► forward immediately (pending values are discarded)
//! ```
//! Each value waits `d` after reaching the head of the queue, so values leave
//! in exactly the order they arrived, at least `d` apart.
//!
//! ## delay_subscription
//! ```text
//! subscribe ──► schedule(d) ──► subscribe upstream with the downstream emitter
//! ```
//! Cancelling before `d` elapses means the upstream is never subscribed.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::core::{Scheduler, Scope};
use crate::error::SequenceError;
use crate::observers::Observer;
use crate::ops::resolve;
use crate::sequence::{Emitter, Sequence};

struct DelayState<T> {
    queue: VecDeque<T>,
    armed: bool,
    upstream_done: bool,
}

/// One delay_elements run: the downstream, its scheduler and the pending queue.
struct DelayRun<T> {
    downstream: Emitter<T>,
    scheduler: Scheduler,
    delay: Duration,
    state: Mutex<DelayState<T>>,
}

impl<T: Send + 'static> DelayRun<T> {
    fn state(&self) -> MutexGuard<'_, DelayState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn arm(self: &Arc<Self>) {
        let run = Arc::clone(self);
        self.scheduler.schedule_in(
            Scope::owned_by(&self.downstream),
            self.delay,
            move || {
                run.fire();
                Ok(())
            },
        );
    }

    fn fire(self: &Arc<Self>) {
        // `armed` stays set while the head is in flight so a concurrent
        // upstream completion cannot overtake it.
        let head = self.state().queue.pop_front();
        if let Some(value) = head {
            self.downstream.next(value);
        }
        let (rearm, finish) = {
            let mut state = self.state();
            let rearm = !state.queue.is_empty();
            state.armed = rearm;
            (rearm, !rearm && state.upstream_done)
        };
        if rearm {
            self.arm();
        } else if finish {
            self.downstream.complete();
        }
    }
}

/// Upstream side of delay_elements.
struct DelayObserver<T> {
    run: Arc<DelayRun<T>>,
}

impl<T: Send + 'static> Observer<T> for DelayObserver<T> {
    fn on_next(&mut self, value: T) {
        let arm = {
            let mut state = self.run.state();
            state.queue.push_back(value);
            !std::mem::replace(&mut state.armed, true)
        };
        if arm {
            self.run.arm();
        }
    }

    fn on_error(&mut self, error: SequenceError) {
        self.run.downstream.error(error);
    }

    fn on_complete(&mut self) {
        let finish = {
            let mut state = self.run.state();
            state.upstream_done = true;
            !state.armed && state.queue.is_empty()
        };
        if finish {
            self.run.downstream.complete();
        }
    }
}

impl<T: Send + 'static> Sequence<T> {
    /// Shifts every value by `delay` on the ambient runtime, preserving receipt order.
    ///
    /// # Example
    /// ```
    /// use std::time::Duration;
    /// use flowseq::Sequence;
    ///
    /// #[tokio::main(flavor = "current_thread", start_paused = true)]
    /// async fn main() {
    ///     let slow = Sequence::from_values(["Garfield", "Kojak"]).delay_elements(Duration::from_millis(500));
    ///     assert_eq!(slow.collect().await.unwrap(), ["Garfield", "Kojak"]);
    /// }
    /// ```
    pub fn delay_elements(&self, delay: Duration) -> Sequence<T> {
        self.delay_elements_with(delay, None)
    }

    /// Shifts every value by `delay` on `scheduler`.
    pub fn delay_elements_on(&self, delay: Duration, scheduler: &Scheduler) -> Sequence<T> {
        self.delay_elements_with(delay, Some(scheduler.clone()))
    }

    /// Subscribes upstream only after `delay` on the ambient runtime.
    pub fn delay_subscription(&self, delay: Duration) -> Sequence<T> {
        self.delay_subscription_with(delay, None)
    }

    /// Subscribes upstream only after `delay` on `scheduler`.
    pub fn delay_subscription_on(&self, delay: Duration, scheduler: &Scheduler) -> Sequence<T> {
        self.delay_subscription_with(delay, Some(scheduler.clone()))
    }

    fn delay_elements_with(&self, delay: Duration, scheduler: Option<Scheduler>) -> Sequence<T> {
        let source = self.clone();
        Sequence::create(move |downstream: Emitter<T>| {
            let scheduler = match resolve(&scheduler) {
                Ok(s) => s,
                Err(err) => return downstream.error(err),
            };
            let run = Arc::new(DelayRun {
                downstream: downstream.clone(),
                scheduler,
                delay,
                state: Mutex::new(DelayState {
                    queue: VecDeque::new(),
                    armed: false,
                    upstream_done: false,
                }),
            });
            source.subscribe_emitter(downstream.derive(DelayObserver { run }));
        })
    }

    fn delay_subscription_with(&self, delay: Duration, scheduler: Option<Scheduler>) -> Sequence<T> {
        let source = self.clone();
        Sequence::create(move |downstream: Emitter<T>| {
            let scheduler = match resolve(&scheduler) {
                Ok(s) => s,
                Err(err) => return downstream.error(err),
            };
            let source = source.clone();
            let target = downstream.clone();
            scheduler.schedule_in(Scope::owned_by(&downstream), delay, move || {
                source.subscribe_emitter(target);
                Ok(())
            });
        })
    }
}
