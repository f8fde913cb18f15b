//! Error types used by sequences, operators and the scheduler.
//!
//! A single enum, [`SequenceError`], covers both failure channels:
//!
//! - **Synchronous**: malformed operator parameters are returned as
//!   [`SequenceError::InvalidArgument`] before anything is subscribed.
//! - **Asynchronous**: everything raised while a subscription is running is
//!   delivered through [`Observer::on_error`](crate::Observer::on_error), never
//!   thrown across a subscription boundary.
//!
//! Cancelling twice, or after completion, is not an error (no variant exists for it).
//!
//! The type provides helper methods (`as_label`, `as_message`) for logging/metrics.

use std::fmt::Display;

use thiserror::Error;

/// # Errors produced by sequences and the scheduler.
///
/// Errors are `Clone` so that a single failure can be fanned out to every
/// branch of a merged or flat-mapped subscription tree.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SequenceError {
    /// An operator was built with malformed parameters (e.g. a negative `range` count).
    #[error("invalid argument: {reason}")]
    InvalidArgument {
        /// What was wrong with the argument.
        reason: String,
    },

    /// A source, mapping function or scheduled task failed.
    #[error("upstream failure: {error}")]
    UpstreamFailure {
        /// The underlying error message.
        error: String,
    },

    /// Timed or worker work was requested outside of a tokio runtime.
    #[error("scheduler unavailable: {reason}")]
    SchedulerUnavailable {
        /// Why no scheduler could be resolved.
        reason: String,
    },

    /// A one-shot source was subscribed more than once.
    #[error("sequence already consumed")]
    AlreadyConsumed,
}

impl SequenceError {
    /// Builds an [`SequenceError::InvalidArgument`] from any displayable reason.
    pub fn invalid_argument(reason: impl Display) -> Self {
        SequenceError::InvalidArgument {
            reason: reason.to_string(),
        }
    }

    /// Builds an [`SequenceError::UpstreamFailure`] from any displayable error.
    ///
    /// # Example
    /// ```
    /// use flowseq::SequenceError;
    ///
    /// let err = SequenceError::upstream("boom");
    /// assert_eq!(err.to_string(), "upstream failure: boom");
    /// ```
    pub fn upstream(error: impl Display) -> Self {
        SequenceError::UpstreamFailure {
            error: error.to_string(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use flowseq::SequenceError;
    ///
    /// let err = SequenceError::invalid_argument("count must be >= 0");
    /// assert_eq!(err.as_label(), "invalid_argument");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            SequenceError::InvalidArgument { .. } => "invalid_argument",
            SequenceError::UpstreamFailure { .. } => "upstream_failure",
            SequenceError::SchedulerUnavailable { .. } => "scheduler_unavailable",
            SequenceError::AlreadyConsumed => "already_consumed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            SequenceError::InvalidArgument { reason } => format!("invalid: {reason}"),
            SequenceError::UpstreamFailure { error } => format!("error: {error}"),
            SequenceError::SchedulerUnavailable { reason } => {
                format!("no scheduler: {reason}")
            }
            SequenceError::AlreadyConsumed => "source already consumed".to_string(),
        }
    }

    /// Converts a caught panic payload into an [`SequenceError::UpstreamFailure`].
    pub(crate) fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        let error = if let Some(s) = payload.downcast_ref::<&'static str>() {
            format!("panicked: {s}")
        } else if let Some(s) = payload.downcast_ref::<String>() {
            format!("panicked: {s}")
        } else {
            "panicked".to_string()
        };
        SequenceError::UpstreamFailure { error }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_are_stable() {
        assert_eq!(
            SequenceError::upstream("x").as_label(),
            "upstream_failure"
        );
        assert_eq!(SequenceError::AlreadyConsumed.as_label(), "already_consumed");
        assert_eq!(
            SequenceError::SchedulerUnavailable {
                reason: "none".into()
            }
            .as_label(),
            "scheduler_unavailable"
        );
    }

    #[test]
    fn test_panic_payload_is_captured() {
        let err = SequenceError::from_panic(Box::new("kaboom"));
        assert_eq!(err, SequenceError::upstream("panicked: kaboom"));

        let err = SequenceError::from_panic(Box::new(String::from("owned")));
        assert_eq!(err.as_message(), "error: panicked: owned");

        let err = SequenceError::from_panic(Box::new(42_u8));
        assert_eq!(err, SequenceError::upstream("panicked"));
    }
}
