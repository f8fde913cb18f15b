//! Execution core: where sequence work runs.
//!
//! - [`config`]: scheduler settings (name, worker cap);
//! - [`scheduler`]: direct, timed and worker execution domains over a tokio handle;
//! - [`task`]: cancellable handle to one piece of scheduled work.

mod config;
mod scheduler;
mod task;

pub use config::Config;
pub(crate) use scheduler::Scope;
pub use scheduler::Scheduler;
pub use task::ScheduledTask;
