//! `subscribe_on`: run the upstream subscribe call on a worker.

use crate::core::{Scheduler, Scope};
use crate::sequence::{Emitter, Sequence};

impl<T: Send + 'static> Sequence<T> {
    /// Moves the upstream subscription onto `scheduler`'s worker domain.
    ///
    /// Synchronous sources then produce on a runtime worker instead of the
    /// subscribing caller. A panic during the upstream subscribe becomes
    /// `on_error`.
    pub fn subscribe_on(&self, scheduler: &Scheduler) -> Sequence<T> {
        let source = self.clone();
        let scheduler = scheduler.clone();
        Sequence::create(move |downstream: Emitter<T>| {
            let source = source.clone();
            let target = downstream.clone();
            scheduler.spawn_in(Scope::owned_by(&downstream), move || {
                source.subscribe_emitter(target);
                Ok(())
            });
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SequenceError;
    use futures::StreamExt;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    #[tokio::test]
    async fn test_subscribe_is_deferred_to_worker() {
        let produced = Arc::new(AtomicBool::new(false));
        let p = produced.clone();
        let seq = Sequence::<i32>::create(move |emitter| {
            p.store(true, Ordering::SeqCst);
            emitter.next(7);
            emitter.complete();
        })
        .subscribe_on(&Scheduler::current());

        let mut stream = seq.into_stream();
        assert!(!produced.load(Ordering::SeqCst), "nothing runs on the caller");

        assert_eq!(stream.next().await, Some(Ok(7)));
        assert_eq!(stream.next().await, None);
        assert!(produced.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_panicking_source_reports_error() {
        let seq = Sequence::<i32>::create(|_| panic!("source exploded"))
            .subscribe_on(&Scheduler::current());
        assert_eq!(
            seq.collect().await,
            Err(SequenceError::upstream("panicked: source exploded"))
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_worker_thread_differs_from_caller() {
        let caller = std::thread::current().id();
        let seen = Arc::new(Mutex::new(None));
        let s = seen.clone();
        let seq = Sequence::<i32>::create(move |emitter| {
            *s.lock().unwrap() = Some(std::thread::current().id());
            emitter.complete();
        })
        .subscribe_on(&Scheduler::current());

        assert_eq!(seq.collect().await, Ok(vec![]));
        let worker = seen.lock().unwrap().expect("subscribed");
        assert_ne!(worker, caller);
    }
}
