//! # Scheduler: direct, timed and worker execution domains.
//!
//! The [`Scheduler`] is the only long-lived shared resource of the crate. It
//! wraps a tokio runtime [`Handle`] and offers three ways to run work:
//!
//! ```text
//! run_now(task)                    ──► caller stack (direct domain)
//! spawn(task)                      ──► [worker permit] ──► task()          (worker domain)
//! schedule(delay, task)            ──► sleep(delay) ──► task()             (timed domain)
//! schedule_periodically(p, task)   ──► loop { sleep(p) ──► task(tick) }    (timed domain)
//! ```
//!
//! ## Rules
//! - Every waiting point (permit, sleep) races the task's cancellation token
//! - A periodic task arms the next tick only after the previous tick returned
//! - A task body that returns `Err` or panics never unwinds into the runtime:
//!   the failure goes to the owning sequence (`on_error`) or, for detached
//!   tasks, to the log
//! - `max_workers` throttles worker-domain tasks only

use std::ops::ControlFlow;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tokio::runtime::Handle;
use tokio::sync::Semaphore;
use tokio::{select, time};
use tokio_util::sync::CancellationToken;

use crate::core::config::Config;
use crate::core::task::ScheduledTask;
use crate::error::SequenceError;
use crate::sequence::Emitter;

/// Callback receiving the failure of a scheduled task.
type FaultHook = Box<dyn FnOnce(SequenceError) + Send>;

/// Ownership of a scheduled task: its cancellation token and where faults go.
pub(crate) struct Scope {
    token: CancellationToken,
    fault: Option<FaultHook>,
}

impl Scope {
    /// Free-standing work: fresh token, faults are logged.
    pub(crate) fn detached() -> Self {
        Self {
            token: CancellationToken::new(),
            fault: None,
        }
    }

    /// Work owned by a subscription: cancelled with it, faults become `on_error`.
    pub(crate) fn owned_by<T: Send + 'static>(emitter: &Emitter<T>) -> Self {
        let owner = emitter.clone();
        Self {
            token: emitter.token().child_token(),
            fault: Some(Box::new(move |err| owner.error(err))),
        }
    }
}

struct Inner {
    handle: Handle,
    cfg: Config,
    workers: Option<Arc<Semaphore>>,
}

/// Executes deferred, delayed and periodic work on a tokio runtime.
///
/// Cheap to clone; all clones share the same runtime handle and worker cap.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use flowseq::Scheduler;
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let scheduler = Scheduler::current();
///     let task = scheduler.schedule(Duration::from_secs(60), || Ok(()));
///     task.cancel();
///     assert!(task.is_cancelled());
///     assert!(!task.has_fired());
/// }
/// ```
#[derive(Clone)]
pub struct Scheduler {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("cfg", &self.inner.cfg)
            .finish_non_exhaustive()
    }
}

impl Scheduler {
    /// Builds a scheduler on the ambient tokio runtime.
    ///
    /// # Panics
    /// Panics when called outside of a tokio runtime, like [`Handle::current`].
    /// Use [`Scheduler::try_current`] to get an error instead.
    pub fn current() -> Self {
        Self::from_handle(Handle::current())
    }

    /// Builds a scheduler on the ambient tokio runtime, if there is one.
    pub fn try_current() -> Result<Self, SequenceError> {
        Handle::try_current()
            .map(Self::from_handle)
            .map_err(|e| SequenceError::SchedulerUnavailable {
                reason: e.to_string(),
            })
    }

    /// Builds a scheduler with default configuration on the given runtime.
    pub fn from_handle(handle: Handle) -> Self {
        Self::with_config(handle, Config::default())
    }

    /// Builds a scheduler with explicit configuration on the given runtime.
    pub fn with_config(handle: Handle, cfg: Config) -> Self {
        let workers = cfg.worker_limit().map(Semaphore::new).map(Arc::new);
        Self {
            inner: Arc::new(Inner {
                handle,
                cfg,
                workers,
            }),
        }
    }

    /// Returns the scheduler configuration.
    pub fn config(&self) -> &Config {
        &self.inner.cfg
    }

    /// Returns the underlying runtime handle.
    pub fn handle(&self) -> &Handle {
        &self.inner.handle
    }

    /// Runs `task` immediately on the caller's stack (direct domain).
    pub fn run_now<R>(&self, task: impl FnOnce() -> R) -> R {
        task()
    }

    /// Hands `task` off to a runtime worker (worker domain).
    pub fn spawn<F>(&self, task: F) -> ScheduledTask
    where
        F: FnOnce() -> Result<(), SequenceError> + Send + 'static,
    {
        self.launch(Scope::detached(), None, task)
    }

    /// Runs `task` once `delay` has elapsed (timed domain).
    pub fn schedule<F>(&self, delay: Duration, task: F) -> ScheduledTask
    where
        F: FnOnce() -> Result<(), SequenceError> + Send + 'static,
    {
        self.launch(Scope::detached(), Some(delay), task)
    }

    /// Runs `task(tick)` every `period`, ticks numbered from 0.
    ///
    /// The first tick fires one `period` after the call. The loop ends when the
    /// task returns `ControlFlow::Break`, fails, or the handle is cancelled.
    pub fn schedule_periodically<F>(&self, period: Duration, task: F) -> ScheduledTask
    where
        F: FnMut(u64) -> Result<ControlFlow<()>, SequenceError> + Send + 'static,
    {
        self.launch_periodic(Scope::detached(), period, task)
    }

    pub(crate) fn spawn_in<F>(&self, scope: Scope, task: F) -> ScheduledTask
    where
        F: FnOnce() -> Result<(), SequenceError> + Send + 'static,
    {
        self.launch(scope, None, task)
    }

    pub(crate) fn schedule_in<F>(&self, scope: Scope, delay: Duration, task: F) -> ScheduledTask
    where
        F: FnOnce() -> Result<(), SequenceError> + Send + 'static,
    {
        self.launch(scope, Some(delay), task)
    }

    pub(crate) fn schedule_periodically_in<F>(
        &self,
        scope: Scope,
        period: Duration,
        task: F,
    ) -> ScheduledTask
    where
        F: FnMut(u64) -> Result<ControlFlow<()>, SequenceError> + Send + 'static,
    {
        self.launch_periodic(scope, period, task)
    }

    /// Spawns one-shot work: optional worker permit, optional delay, then the body.
    fn launch<F>(&self, scope: Scope, delay: Option<Duration>, task: F) -> ScheduledTask
    where
        F: FnOnce() -> Result<(), SequenceError> + Send + 'static,
    {
        let Scope { token, fault } = scope;
        let handle = ScheduledTask::new(token.clone());
        let fired = handle.clone();
        let name = self.inner.cfg.name.clone();
        let deadline = delay.map(|d| time::Instant::now() + d);
        let workers = match deadline {
            None => self.inner.workers.clone(),
            Some(_) => None,
        };

        self.inner.handle.spawn(async move {
            let _permit = match workers {
                Some(sem) => {
                    select! {
                        biased;
                        _ = token.cancelled() => return,
                        res = sem.acquire_owned() => match res {
                            Ok(permit) => Some(permit),
                            Err(_closed) => return,
                        },
                    }
                }
                None => None,
            };

            if let Some(deadline) = deadline {
                let sleep = time::sleep_until(deadline);
                tokio::pin!(sleep);
                select! {
                    biased;
                    _ = token.cancelled() => return,
                    _ = &mut sleep => {}
                }
            }
            if token.is_cancelled() {
                return;
            }

            fired.mark_fired();
            let outcome = match AssertUnwindSafe(async move { task() })
                .catch_unwind()
                .await
            {
                Ok(res) => res,
                Err(panic) => Err(SequenceError::from_panic(panic)),
            };
            if let Err(err) = outcome {
                report_fault(&name, fault, err);
            }
        });
        handle
    }

    /// Spawns the tick loop backing [`Scheduler::schedule_periodically`].
    fn launch_periodic<F>(&self, scope: Scope, period: Duration, mut task: F) -> ScheduledTask
    where
        F: FnMut(u64) -> Result<ControlFlow<()>, SequenceError> + Send + 'static,
    {
        let Scope { token, mut fault } = scope;
        let handle = ScheduledTask::new(token.clone());
        let fired = handle.clone();
        let name = self.inner.cfg.name.clone();

        self.inner.handle.spawn(async move {
            let mut tick: u64 = 0;
            loop {
                let sleep = time::sleep(period);
                tokio::pin!(sleep);
                select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = &mut sleep => {}
                }
                if token.is_cancelled() {
                    break;
                }

                fired.mark_fired();
                let outcome = match AssertUnwindSafe(async { task(tick) })
                    .catch_unwind()
                    .await
                {
                    Ok(res) => res,
                    Err(panic) => Err(SequenceError::from_panic(panic)),
                };
                match outcome {
                    Ok(ControlFlow::Continue(())) => tick += 1,
                    Ok(ControlFlow::Break(())) => break,
                    Err(err) => {
                        report_fault(&name, fault.take(), err);
                        break;
                    }
                }
            }
        });
        handle
    }
}

fn report_fault(scheduler: &str, fault: Option<FaultHook>, err: SequenceError) {
    match fault {
        Some(hook) => hook(err),
        None => tracing::warn!(
            scheduler,
            label = err.as_label(),
            error = %err,
            "detached scheduled task failed"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

    #[tokio::test(start_paused = true)]
    async fn test_schedule_fires_after_delay() {
        let scheduler = Scheduler::current();
        let hits = Arc::new(AtomicUsize::new(0));
        let h = hits.clone();
        let task = scheduler.schedule(Duration::from_millis(100), move || {
            h.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        time::sleep(Duration::from_millis(99)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert!(!task.has_fired());

        time::sleep(Duration::from_millis(2)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(task.has_fired());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_before_fire_prevents_run() {
        let scheduler = Scheduler::current();
        let hits = Arc::new(AtomicUsize::new(0));
        let h = hits.clone();
        let task = scheduler.schedule(Duration::from_millis(100), move || {
            h.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        time::sleep(Duration::from_millis(50)).await;
        task.cancel();
        task.cancel();
        time::sleep(Duration::from_millis(200)).await;

        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert!(!task.has_fired());
        assert!(task.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_after_fire_is_noop() {
        let scheduler = Scheduler::current();
        let task = scheduler.schedule(Duration::from_millis(10), || Ok(()));
        time::sleep(Duration::from_millis(20)).await;

        task.cancel();
        assert!(task.has_fired());
    }

    #[tokio::test(start_paused = true)]
    async fn test_periodic_ticks_do_not_overlap() {
        let scheduler = Scheduler::current();
        let ticks = Arc::new(Mutex::new(Vec::new()));
        let t = ticks.clone();
        let start = time::Instant::now();
        let task = scheduler.schedule_periodically(Duration::from_millis(100), move |tick| {
            t.lock().unwrap().push((tick, start.elapsed().as_millis()));
            if tick == 2 {
                Ok(ControlFlow::Break(()))
            } else {
                Ok(ControlFlow::Continue(()))
            }
        });

        time::sleep(Duration::from_secs(1)).await;
        assert!(task.has_fired());
        assert_eq!(
            *ticks.lock().unwrap(),
            vec![(0, 100), (1, 200), (2, 300)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_periodic_stops_on_cancel() {
        let scheduler = Scheduler::current();
        let count = Arc::new(AtomicU64::new(0));
        let c = count.clone();
        let task = scheduler.schedule_periodically(Duration::from_millis(100), move |_| {
            c.fetch_add(1, Ordering::SeqCst);
            Ok(ControlFlow::Continue(()))
        });

        time::sleep(Duration::from_millis(350)).await;
        task.cancel();
        time::sleep(Duration::from_secs(5)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_panic_is_contained() {
        let scheduler = Scheduler::current();
        let task = scheduler.spawn(|| panic!("scheduled boom"));
        time::sleep(Duration::from_millis(1)).await;
        assert!(task.has_fired());

        // The runtime keeps running other work after the panic.
        let after = scheduler.schedule(Duration::from_millis(5), || Ok(()));
        time::sleep(Duration::from_millis(10)).await;
        assert!(after.has_fired());
    }

    #[tokio::test(start_paused = true)]
    async fn test_worker_cap_serializes_spawns() {
        let scheduler = Scheduler::with_config(
            Handle::current(),
            Config::default().with_name("capped").with_max_workers(1),
        );
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        for _ in 0..4 {
            let running = running.clone();
            let peak = peak.clone();
            scheduler.spawn(move || {
                let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                running.fetch_sub(1, Ordering::SeqCst);
                Ok(())
            });
        }
        time::sleep(Duration::from_millis(10)).await;
        assert_eq!(peak.load(Ordering::SeqCst), 1);
        assert_eq!(scheduler.config().name, "capped");
    }

    #[test]
    fn test_try_current_outside_runtime() {
        let err = Scheduler::try_current().unwrap_err();
        assert_eq!(err.as_label(), "scheduler_unavailable");
    }

    #[tokio::test]
    async fn test_run_now_is_synchronous() {
        let scheduler = Scheduler::current();
        assert_eq!(scheduler.run_now(|| 7), 7);
    }
}
