//! `log(name)`: trace every signal passing through a point of the chain.

use std::borrow::Cow;
use std::fmt::Debug;
use std::sync::Arc;

use crate::error::SequenceError;
use crate::observers::Observer;
use crate::sequence::{Emitter, Sequence};

struct Tap<T> {
    name: Arc<str>,
    downstream: Emitter<T>,
}

impl<T: Debug + Send + 'static> Observer<T> for Tap<T> {
    fn on_next(&mut self, value: T) {
        tracing::info!(seq = %self.name, value = ?value, "next");
        self.downstream.next(value);
    }

    fn on_error(&mut self, error: SequenceError) {
        tracing::warn!(seq = %self.name, label = error.as_label(), error = %error, "error");
        self.downstream.error(error);
    }

    fn on_complete(&mut self) {
        tracing::info!(seq = %self.name, "complete");
        self.downstream.complete();
    }
}

impl<T: Debug + Send + 'static> Sequence<T> {
    /// Emits a `tracing` event for the subscription and every signal, unchanged.
    pub fn log(&self, name: impl Into<Cow<'static, str>>) -> Sequence<T> {
        let name: Arc<str> = Arc::from(name.into().as_ref());
        let source = self.clone();
        Sequence::create(move |downstream: Emitter<T>| {
            tracing::info!(seq = %name, "subscribe");
            let upstream = downstream.derive(Tap {
                name: Arc::clone(&name),
                downstream: downstream.clone(),
            });
            source.subscribe_emitter(upstream);
        })
    }
}
