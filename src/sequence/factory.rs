//! # Sequence: a lazy, re-subscribable description of a push run.
//!
//! A [`Sequence`] holds only a subscription function. Nothing happens until
//! [`Sequence::subscribe`] is called; every call starts an independent run
//! with its own [`Emitter`], latch and cancellation token.
//!
//! ## Lifecycle
//! ```text
//! subscribe(observer)
//!   ├─► token = CancellationToken::new()
//!   ├─► emitter = Emitter(observer, token)
//!   ├─► on_subscribe(emitter)      (runs synchronously up to the first suspension point)
//!   └─► Subscription(token)        (returned immediately)
//! ```

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::error::SequenceError;
use crate::observers::{CallbackObserver, Observer};
use crate::sequence::{Emitter, Subscription};

type OnSubscribe<T> = dyn Fn(Emitter<T>) + Send + Sync;

/// Cold, push-based sequence of `T` values terminated by completion or failure.
///
/// Cloning is cheap and yields the same description; each subscription runs
/// independently.
pub struct Sequence<T> {
    on_subscribe: Arc<OnSubscribe<T>>,
}

impl<T> Clone for Sequence<T> {
    fn clone(&self) -> Self {
        Self {
            on_subscribe: Arc::clone(&self.on_subscribe),
        }
    }
}

impl<T> std::fmt::Debug for Sequence<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sequence")
            .field("item", &std::any::type_name::<T>())
            .finish_non_exhaustive()
    }
}

impl<T: Send + 'static> Sequence<T> {
    /// Builds a sequence from a subscription function.
    ///
    /// The function receives the run's [`Emitter`] and pushes signals into it,
    /// synchronously or from tasks it schedules.
    pub fn create<F>(on_subscribe: F) -> Self
    where
        F: Fn(Emitter<T>) + Send + Sync + 'static,
    {
        Self {
            on_subscribe: Arc::new(on_subscribe),
        }
    }

    /// Starts a run delivering to `observer`.
    pub fn subscribe<O: Observer<T>>(&self, observer: O) -> Subscription {
        let token = CancellationToken::new();
        self.subscribe_emitter(Emitter::new(observer, token.clone()));
        Subscription::new(token)
    }

    /// Starts a run handling values only; errors are logged.
    pub fn subscribe_fn<N>(&self, on_next: N) -> Subscription
    where
        N: FnMut(T) + Send + 'static,
    {
        self.subscribe(CallbackObserver::new(on_next))
    }

    /// Starts a run with handlers for all three signals.
    pub fn subscribe_with<N, E, C>(&self, on_next: N, on_error: E, on_complete: C) -> Subscription
    where
        N: FnMut(T) + Send + 'static,
        E: FnMut(SequenceError) + Send + 'static,
        C: FnMut() + Send + 'static,
    {
        self.subscribe(CallbackObserver::with_handlers(on_next, on_error, on_complete))
    }

    /// Runs the subscription function against an existing emitter.
    ///
    /// Operators use this to attach upstream runs to derived emitters. A panic
    /// raised while the run pushes synchronously (source, mapper, predicate)
    /// is turned into `on_error` on that emitter.
    pub(crate) fn subscribe_emitter(&self, emitter: Emitter<T>) {
        if emitter.is_closed() {
            return;
        }
        let sink = emitter.clone();
        if let Err(panic) = catch_unwind(AssertUnwindSafe(|| (self.on_subscribe)(emitter))) {
            sink.error(SequenceError::from_panic(panic));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_each_subscribe_is_independent_run() {
        let runs = Arc::new(AtomicUsize::new(0));
        let r = runs.clone();
        let seq = Sequence::create(move |emitter| {
            let run = r.fetch_add(1, Ordering::SeqCst);
            emitter.next(run);
            emitter.complete();
        });

        let seen = Arc::new(Mutex::new(Vec::new()));
        for _ in 0..3 {
            let s = seen.clone();
            seq.subscribe_fn(move |v| s.lock().unwrap().push(v));
        }
        assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn test_cancel_twice_is_noop() {
        let completes = Arc::new(AtomicUsize::new(0));
        let errors = Arc::new(AtomicUsize::new(0));
        let (c, e) = (completes.clone(), errors.clone());

        let pending = Arc::new(Mutex::new(None));
        let p = pending.clone();
        let seq = Sequence::<i32>::create(move |emitter| {
            *p.lock().unwrap() = Some(emitter);
        });

        let sub = seq.subscribe_with(
            |_| {},
            move |_| {
                e.fetch_add(1, Ordering::SeqCst);
            },
            move || {
                c.fetch_add(1, Ordering::SeqCst);
            },
        );
        assert!(!sub.is_closed());
        sub.cancel();
        sub.cancel();
        assert!(sub.is_closed());

        let emitter = pending.lock().unwrap().take().unwrap();
        assert!(!emitter.next(1));
        emitter.complete();
        assert_eq!(completes.load(Ordering::SeqCst), 0);
        assert_eq!(errors.load(Ordering::SeqCst), 0);
    }

    fn outcome<T: Send + 'static>(seq: &Sequence<T>) -> Arc<Mutex<Vec<String>>> {
        let events = Arc::new(Mutex::new(Vec::new()));
        let (n, e, c) = (events.clone(), events.clone(), events.clone());
        seq.subscribe_with(
            move |_| n.lock().unwrap().push("next".to_string()),
            move |err| e.lock().unwrap().push(format!("error:{err}")),
            move || c.lock().unwrap().push("complete".to_string()),
        );
        events
    }

    #[test]
    fn test_panicking_operator_becomes_error() {
        let mapped = Sequence::from_values([1, 2]).map(|_| -> i32 { panic!("bad map") });
        assert_eq!(
            *outcome(&mapped).lock().unwrap(),
            vec!["error:upstream failure: panicked: bad map"]
        );

        let filtered = Sequence::from_values([1, 2, 3]).filter(|v| {
            assert!(*v < 2, "too big");
            true
        });
        assert_eq!(
            *outcome(&filtered).lock().unwrap(),
            vec!["next", "error:upstream failure: panicked: too big"]
        );
    }

    #[test]
    fn test_panicking_generator_becomes_error() {
        let seq = Sequence::<i32>::from_lazy_source(|| -> Vec<i32> { panic!("no source") });
        assert_eq!(
            *outcome(&seq).lock().unwrap(),
            vec!["error:upstream failure: panicked: no source"]
        );
    }

    #[test]
    fn test_cancel_after_completion_is_noop() {
        let completes = Arc::new(AtomicUsize::new(0));
        let c = completes.clone();
        let seq = Sequence::<i32>::create(|emitter| emitter.complete());

        let sub = seq.subscribe_with(
            |_| {},
            |_| {},
            move || {
                c.fetch_add(1, Ordering::SeqCst);
            },
        );
        assert!(sub.is_closed());
        sub.cancel();
        sub.cancel();
        assert_eq!(completes.load(Ordering::SeqCst), 1);
    }
}
