//! # flowseq
//!
//! **flowseq** is a small push-based reactive sequence library for Rust.
//!
//! A [`Sequence`] is a cold, reusable description of a run of values. Every
//! subscription builds a fresh run that emits values in order, then at most
//! one terminal signal. Operators compose sequences over in-memory data,
//! timers, merging and concurrent flat-mapping, all on a tokio runtime.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   ┌────────────────┐   ┌────────────────┐   ┌────────────────┐
//!   │ from_values    │   │ interval       │   │ range          │
//!   │ (direct domain)│   │ (timed domain) │   │ (direct domain)│
//!   └───────┬────────┘   └───────┬────────┘   └───────┬────────┘
//!           ▼                    ▼                    ▼
//! ┌──────────────────────────────────────────────────────────────────┐
//! │  Operators (each subscribes upstream with a derived Emitter)     │
//! │  map · filter · take · delay_elements · delay_subscription       │
//! │  merge · flat_map · subscribe_on                                 │
//! └──────┬─────────────────────────────┬─────────────────────────────┘
//!        │ schedule / spawn            │ next / error / complete
//!        ▼                             ▼
//! ┌───────────────────────┐   ┌──────────────────────────────────────┐
//! │ Scheduler             │   │ Emitter (per run)                    │
//! │ - tokio Handle        │   │ - gate (serializes observer calls)   │
//! │ - worker semaphore    │   │ - TerminalLatch (one terminal, CAS)  │
//! │ - catch_unwind faults │   │ - CancellationToken (tree)           │
//! └───────────────────────┘   └──────────────────┬───────────────────┘
//!                                                ▼
//!                                      Observer::on_next / on_error /
//!                                      on_complete   (or SequenceStream)
//! ```
//!
//! ### Lifecycle of one run
//! ```text
//! seq.subscribe(observer)
//!   ├─► root token + Emitter(observer)
//!   ├─► operator chain subscribes upstream (child tokens)
//!   ├─► sources push synchronously or from scheduled tasks
//!   │
//!   └─ run ends on the first of:
//!        - complete / error reaching the root emitter (latch closes, token cancelled)
//!        - Subscription::cancel()
//!      either way every upstream token and pending timer is cancelled
//! ```
//!
//! ## Features
//! | Area              | Description                                              | Key types / traits                        |
//! |-------------------|----------------------------------------------------------|-------------------------------------------|
//! | **Sequences**     | Cold factories, sources and operators.                   | [`Sequence`], [`merge`], [`FlatMapFn`]    |
//! | **Consumers**     | Push observers or pull streams.                          | [`Observer`], [`SequenceStream`]          |
//! | **Cancellation**  | Idempotent handle cancelling the whole run.              | [`Subscription`]                          |
//! | **Scheduling**    | Timed and worker execution on a tokio runtime.           | [`Scheduler`], [`ScheduledTask`]          |
//! | **Errors**        | One typed error delivered through `on_error`.            | [`SequenceError`]                         |
//! | **Configuration** | Scheduler name and worker cap.                           | [`Config`]                                |
//!
//! ## Optional features
//! - `logging`: exports [`LogObserver`] and the `Sequence::log` operator _(demo/debug)_.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use flowseq::{Sequence, merge};
//!
//! #[tokio::main(flavor = "current_thread", start_paused = true)]
//! async fn main() -> Result<(), flowseq::SequenceError> {
//!     let pets = Sequence::from_values(["Garfield", "Kojak", "Barbossa"])
//!         .delay_elements(Duration::from_millis(500));
//!     let foods = Sequence::from_values(["Lasagna", "Lollipops", "Apples"])
//!         .delay_subscription(Duration::from_millis(250))
//!         .delay_elements(Duration::from_millis(500));
//!
//!     let all = merge(&pets, &foods).collect().await?;
//!     assert_eq!(all, ["Garfield", "Lasagna", "Kojak", "Lollipops", "Barbossa", "Apples"]);
//!     Ok(())
//! }
//! ```
mod core;
mod error;
mod observers;
mod ops;
mod sequence;

// ---- Public re-exports ----

pub use crate::core::{Config, ScheduledTask, Scheduler};
pub use error::SequenceError;
pub use observers::{CallbackObserver, Observer};
pub use ops::{Fallible, FlatMapFn, merge, merge_all};
pub use sequence::{Emitter, Sequence, SequenceStream, Subscription, Terminal, TerminalLatch};

// Optional: expose a stdout observer (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use observers::LogObserver;
