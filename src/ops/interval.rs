//! # Interval: periodic tick source.
//!
//! ```text
//! subscribe ──► schedule_periodically(period)
//!                 tick 0 @ period, tick 1 @ 2·period, ...
//!                 └─► emitter.next(tick) == false ──► stop arming
//! ```
//!
//! The sequence never completes on its own; bound it with `take` or cancel
//! the subscription.

use std::ops::ControlFlow;
use std::time::Duration;

use crate::core::{Scheduler, Scope};
use crate::ops::resolve;
use crate::sequence::{Emitter, Sequence};

impl Sequence<u64> {
    /// Ticks `0, 1, 2, ...` every `period` on the ambient runtime.
    ///
    /// Outside a tokio runtime the subscriber receives
    /// [`SequenceError::SchedulerUnavailable`](crate::SequenceError::SchedulerUnavailable).
    pub fn interval(period: Duration) -> Self {
        interval_with(period, None)
    }

    /// Ticks `0, 1, 2, ...` every `period` on `scheduler`.
    pub fn interval_on(period: Duration, scheduler: &Scheduler) -> Self {
        interval_with(period, Some(scheduler.clone()))
    }
}

fn interval_with(period: Duration, scheduler: Option<Scheduler>) -> Sequence<u64> {
    Sequence::create(move |emitter: Emitter<u64>| {
        let scheduler = match resolve(&scheduler) {
            Ok(s) => s,
            Err(err) => return emitter.error(err),
        };
        let ticks = emitter.clone();
        scheduler.schedule_periodically_in(Scope::owned_by(&emitter), period, move |tick| {
            if ticks.next(tick) {
                Ok(ControlFlow::Continue(()))
            } else {
                Ok(ControlFlow::Break(()))
            }
        });
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SequenceError;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU64, Ordering};
    use tokio::time;

    #[tokio::test(start_paused = true)]
    async fn test_interval_take_five() {
        let ticks = Sequence::interval(Duration::from_secs(1)).take(5);
        let start = time::Instant::now();
        assert_eq!(ticks.collect().await, Ok(vec![0, 1, 2, 3, 4]));
        assert_eq!(start.elapsed(), Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_take_releases_interval_timer() {
        let produced = Arc::new(AtomicU64::new(0));
        let p = produced.clone();
        let ticks = Sequence::interval(Duration::from_secs(1))
            .inspect(move |_| {
                p.fetch_add(1, Ordering::SeqCst);
            })
            .take(5);

        assert_eq!(ticks.collect().await, Ok(vec![0, 1, 2, 3, 4]));
        time::sleep(Duration::from_secs(30)).await;
        assert_eq!(produced.load(Ordering::SeqCst), 5, "no sixth tick after take(5)");
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_ticks() {
        let seen = Arc::new(AtomicU64::new(0));
        let s = seen.clone();
        let sub = Sequence::interval(Duration::from_millis(100)).subscribe_fn(move |_| {
            s.fetch_add(1, Ordering::SeqCst);
        });

        time::sleep(Duration::from_millis(250)).await;
        sub.cancel();
        time::sleep(Duration::from_secs(2)).await;
        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_no_runtime_reports_error() {
        let err = Arc::new(std::sync::Mutex::new(None));
        let e = err.clone();
        Sequence::interval(Duration::from_secs(1)).subscribe_with(
            |_| {},
            move |error| *e.lock().unwrap() = Some(error),
            || {},
        );
        assert!(matches!(
            *err.lock().unwrap(),
            Some(SequenceError::SchedulerUnavailable { .. })
        ));
    }
}
