//! Consumer side of a subscription.
//!
//! - [`Observer`] receives `on_next* (on_complete | on_error)?`
//! - [`CallbackObserver`] adapts closures (used by `subscribe_fn` / `subscribe_with`)
//! - `LogObserver` prints every signal (feature `logging`)

#[cfg(feature = "logging")]
mod log;
mod observer;

#[cfg(feature = "logging")]
pub use log::LogObserver;
pub use observer::{CallbackObserver, Observer};
