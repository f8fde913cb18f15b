//! Sequence core: the lazy factory, its per-run sink, and cancellation.
//!
//! ## Contents
//! - [`Sequence`] cold description of a push run (subscription function)
//! - [`Emitter`] per-run sink enforcing the signal grammar
//! - [`TerminalLatch`] atomic at-most-once terminal guard
//! - [`Subscription`] idempotent cancellation handle
//! - [`SequenceStream`] pull adapter (`futures::Stream`)
//!
//! ## Cancellation tree
//! ```text
//! Subscription(token)
//!   └─► root Emitter (token)
//!         └─► operator upstream Emitter (token.child_token())
//!               └─► ... (child of child)
//! ```
//! Cancelling, completing or failing any emitter cancels its whole upstream
//! subtree within one step; timers scheduled for a run race that token.

mod emitter;
mod factory;
mod latch;
mod stream;
mod subscription;

pub use emitter::Emitter;
pub use factory::Sequence;
pub use latch::{Terminal, TerminalLatch};
pub use stream::SequenceStream;
pub use subscription::Subscription;
