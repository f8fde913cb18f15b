//! # Terminal latch: at-most-once completion/error guard.
//!
//! Every [`Emitter`](crate::Emitter) owns one latch. Operators that fan in
//! (merge, flat_map) route all of their branches into the same downstream
//! emitter, so that emitter's latch is the single writer for the whole tree.
//!
//! ```text
//! Open ──try_close(Completed)──► Completed
//!   └───try_close(Errored)────► Errored
//! (any later try_close returns false)
//! ```

use std::sync::atomic::{AtomicU8, Ordering};

const OPEN: u8 = 0;
const COMPLETED: u8 = 1;
const ERRORED: u8 = 2;

/// Terminal signal recorded by a [`TerminalLatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminal {
    /// The run completed normally.
    Completed,
    /// The run failed.
    Errored,
}

/// Atomic compare-and-set guard for the open → terminal transition.
#[derive(Debug)]
pub struct TerminalLatch {
    state: AtomicU8,
}

impl TerminalLatch {
    /// Creates an open latch.
    pub const fn new() -> Self {
        Self {
            state: AtomicU8::new(OPEN),
        }
    }

    /// Attempts the open → `terminal` transition.
    ///
    /// Returns `true` for exactly one caller; every racing or later caller gets `false`.
    pub fn try_close(&self, terminal: Terminal) -> bool {
        let target = match terminal {
            Terminal::Completed => COMPLETED,
            Terminal::Errored => ERRORED,
        };
        self.state
            .compare_exchange(OPEN, target, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Returns true once a terminal signal was recorded.
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.state.load(Ordering::Acquire) != OPEN
    }

    /// Returns the recorded terminal signal, if any.
    pub fn terminal(&self) -> Option<Terminal> {
        match self.state.load(Ordering::Acquire) {
            COMPLETED => Some(Terminal::Completed),
            ERRORED => Some(Terminal::Errored),
            _ => None,
        }
    }
}

impl Default for TerminalLatch {
    fn default() -> Self {
        Self::new()
    }
}
