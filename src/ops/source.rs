//! # Source sequences over in-memory data.
//!
//! Every source emits on the direct domain: values are pushed synchronously
//! inside `subscribe`, in exact source order, followed by one completion.
//! Emission stops as soon as the run is closed (cancelled downstream).
//!
//! | Constructor | Per-subscription data |
//! |-------------|-----------------------|
//! | [`Sequence::just`] | one cloned value |
//! | [`Sequence::from_values`] / [`Sequence::from_collection`] | cloned collection |
//! | [`Sequence::from_lazy_source`] | fresh iterator from a generator |
//! | [`Sequence::from_iterator`] | one-shot; later runs fail with `AlreadyConsumed` |
//! | [`Sequence::range`] | arithmetic progression |

use std::sync::{Arc, Mutex, PoisonError};

use crate::error::SequenceError;
use crate::sequence::{Emitter, Sequence};

/// Pushes every item of `iter` into `emitter`, then completes.
fn drain<T, I>(emitter: &Emitter<T>, iter: I)
where
    T: Send + 'static,
    I: IntoIterator<Item = T>,
{
    let mut iter = iter.into_iter();
    while !emitter.is_closed() {
        match iter.next() {
            Some(value) => {
                emitter.next(value);
            }
            None => return emitter.complete(),
        }
    }
}

impl<T: Send + 'static> Sequence<T> {
    /// Sequence emitting `value` once, then completing.
    pub fn just(value: T) -> Self
    where
        T: Clone + Sync,
    {
        Self::create(move |emitter| drain(&emitter, std::iter::once(value.clone())))
    }

    /// Sequence completing immediately without values.
    pub fn empty() -> Self {
        Self::create(|emitter| emitter.complete())
    }

    /// Sequence failing immediately with `error`.
    pub fn failed(error: SequenceError) -> Self {
        Self::create(move |emitter| emitter.error(error.clone()))
    }

    /// Sequence emitting the given values in order.
    ///
    /// # Example
    /// ```
    /// use std::sync::{Arc, Mutex};
    /// use flowseq::Sequence;
    ///
    /// let fruits = Sequence::from_values(["Apple", "Orange", "Grape"]);
    /// let seen = Arc::new(Mutex::new(Vec::new()));
    /// let sink = seen.clone();
    /// fruits.subscribe_fn(move |f| sink.lock().unwrap().push(f));
    /// assert_eq!(*seen.lock().unwrap(), ["Apple", "Orange", "Grape"]);
    /// ```
    pub fn from_values<const N: usize>(values: [T; N]) -> Self
    where
        T: Clone + Sync,
    {
        Self::from_collection(values)
    }

    /// Sequence emitting the items of `collection` in iteration order.
    ///
    /// The collection is cloned for every subscription.
    pub fn from_collection<C>(collection: C) -> Self
    where
        C: IntoIterator<Item = T> + Clone + Send + Sync + 'static,
    {
        Self::create(move |emitter| drain(&emitter, collection.clone()))
    }

    /// Sequence pulling a fresh iterator from `source` for every subscription.
    pub fn from_lazy_source<F, I>(source: F) -> Self
    where
        F: Fn() -> I + Send + Sync + 'static,
        I: IntoIterator<Item = T>,
    {
        Self::create(move |emitter| drain(&emitter, source()))
    }

    /// Sequence over an already-built iterator; it can be consumed only once.
    ///
    /// Any subscription after the first receives [`SequenceError::AlreadyConsumed`].
    pub fn from_iterator<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: Send + 'static,
    {
        let slot = Arc::new(Mutex::new(Some(iter.into_iter())));
        Self::create(move |emitter| {
            let taken = slot.lock().unwrap_or_else(PoisonError::into_inner).take();
            match taken {
                Some(iter) => drain(&emitter, iter),
                None => emitter.error(SequenceError::AlreadyConsumed),
            }
        })
    }
}

impl Sequence<i32> {
    /// Sequence emitting `count` consecutive integers starting at `start`.
    ///
    /// # Errors
    /// [`SequenceError::InvalidArgument`] when `count < 0` or when the last
    /// value would overflow `i32`. Nothing is subscribed in that case.
    ///
    /// # Example
    /// ```
    /// use flowseq::Sequence;
    ///
    /// assert!(Sequence::range(1, 5).is_ok());
    /// assert_eq!(Sequence::range(1, -1).unwrap_err().as_label(), "invalid_argument");
    /// ```
    pub fn range(start: i32, count: i32) -> Result<Self, SequenceError> {
        if count < 0 {
            return Err(SequenceError::invalid_argument(format!(
                "count must be >= 0, got {count}"
            )));
        }
        let end = i64::from(start) + i64::from(count);
        if end - 1 > i64::from(i32::MAX) {
            return Err(SequenceError::invalid_argument(format!(
                "start + count must not exceed i32::MAX, got {start} + {count}"
            )));
        }
        Ok(Self::create(move |emitter| {
            drain(&emitter, (i64::from(start)..end).map(|v| v as i32))
        }))
    }
}
