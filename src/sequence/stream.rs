//! # Pull adapter: consume a sequence as a [`futures::Stream`].
//!
//! ```text
//! Sequence ──subscribe──► ChannelObserver ──unbounded mpsc──► SequenceStream::poll_next
//!                          on_next   → Ok(v)
//!                          on_error  → Err(e), close
//!                          on_complete → close
//! ```
//!
//! Dropping the stream cancels the underlying subscription.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::{Stream, StreamExt};
use tokio::sync::mpsc;

use crate::error::SequenceError;
use crate::observers::Observer;
use crate::sequence::{Sequence, Subscription};

struct ChannelObserver<T> {
    tx: Option<mpsc::UnboundedSender<Result<T, SequenceError>>>,
}

impl<T: Send + 'static> Observer<T> for ChannelObserver<T> {
    fn on_next(&mut self, value: T) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(Ok(value));
        }
    }

    fn on_error(&mut self, error: SequenceError) {
        if let Some(tx) = self.tx.take() {
            let _ = tx.send(Err(error));
        }
    }

    fn on_complete(&mut self) {
        self.tx = None;
    }
}

/// Stream of the signals of one subscription run.
///
/// Yields `Ok(value)` per item, then ends on completion, or yields one
/// `Err(error)` and ends on failure.
pub struct SequenceStream<T> {
    rx: mpsc::UnboundedReceiver<Result<T, SequenceError>>,
    subscription: Subscription,
}

impl<T> SequenceStream<T> {
    /// Subscription backing this stream.
    pub fn subscription(&self) -> &Subscription {
        &self.subscription
    }
}

impl<T> Stream for SequenceStream<T> {
    type Item = Result<T, SequenceError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

impl<T> Drop for SequenceStream<T> {
    fn drop(&mut self) {
        self.subscription.cancel();
    }
}

impl<T: Send + 'static> Sequence<T> {
    /// Subscribes and exposes the run as a [`Stream`].
    ///
    /// # Example
    /// ```
    /// use futures::StreamExt;
    /// use flowseq::Sequence;
    ///
    /// #[tokio::main(flavor = "current_thread")]
    /// async fn main() {
    ///     let mut stream = Sequence::from_values(["a", "b"]).into_stream();
    ///     assert_eq!(stream.next().await, Some(Ok("a")));
    ///     assert_eq!(stream.next().await, Some(Ok("b")));
    ///     assert_eq!(stream.next().await, None);
    /// }
    /// ```
    pub fn into_stream(self) -> SequenceStream<T> {
        let (tx, rx) = mpsc::unbounded_channel();
        let subscription = self.subscribe(ChannelObserver { tx: Some(tx) });
        SequenceStream { rx, subscription }
    }

    /// Runs the sequence to its end and gathers every value.
    ///
    /// Returns the first error instead when the run fails.
    pub async fn collect(self) -> Result<Vec<T>, SequenceError> {
        let mut stream = self.into_stream();
        let mut out = Vec::new();
        while let Some(item) = stream.next().await {
            out.push(item?);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_collect_gathers_values() {
        let values = Sequence::from_values([1, 2, 3]).collect().await;
        assert_eq!(values, Ok(vec![1, 2, 3]));
    }

    #[tokio::test]
    async fn test_collect_returns_error() {
        let seq = Sequence::<i32>::create(|emitter| {
            emitter.next(1);
            emitter.error(SequenceError::upstream("broken"));
        });
        assert_eq!(seq.collect().await, Err(SequenceError::upstream("broken")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_subscription() {
        let stream = Sequence::interval(Duration::from_millis(10)).into_stream();
        let sub = stream.subscription().clone();
        assert!(!sub.is_closed());
        drop(stream);
        assert!(sub.is_closed());
    }
}
