//! Element-wise operators: map, try_map, filter, inspect.
//!
//! All four run on the emitting caller's stack and forward terminal signals
//! unchanged. A failing `try_map` closes the run with its error and cancels
//! the upstream.

use std::sync::Arc;

use crate::error::SequenceError;
use crate::sequence::{Emitter, Sequence};

impl<T: Send + 'static> Sequence<T> {
    /// Applies `f` to every value.
    ///
    /// # Example
    /// ```
    /// use flowseq::Sequence;
    ///
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() {
    /// let upper = Sequence::from_values(["kojak", "apples"]).map(str::to_uppercase);
    /// assert_eq!(upper.collect().await.unwrap(), ["KOJAK", "APPLES"]);
    /// # }
    /// ```
    pub fn map<R, F>(&self, f: F) -> Sequence<R>
    where
        R: Send + 'static,
        F: Fn(T) -> R + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        self.relay(move |out: Emitter<R>| {
            let f = Arc::clone(&f);
            move |value: T| {
                out.next(f(value));
            }
        })
    }

    /// Applies a fallible `f`; the first `Err` terminates the run with that error.
    pub fn try_map<R, F>(&self, f: F) -> Sequence<R>
    where
        R: Send + 'static,
        F: Fn(T) -> Result<R, SequenceError> + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        self.relay(move |out: Emitter<R>| {
            let f = Arc::clone(&f);
            move |value: T| match f(value) {
                Ok(mapped) => {
                    out.next(mapped);
                }
                Err(err) => out.error(err),
            }
        })
    }

    /// Keeps the values for which `predicate` holds.
    pub fn filter<P>(&self, predicate: P) -> Sequence<T>
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let predicate = Arc::new(predicate);
        self.relay(move |out: Emitter<T>| {
            let predicate = Arc::clone(&predicate);
            move |value: T| {
                if predicate(&value) {
                    out.next(value);
                }
            }
        })
    }

    /// Calls `f` on every value before passing it on.
    pub fn inspect<F>(&self, f: F) -> Sequence<T>
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        self.relay(move |out: Emitter<T>| {
            let f = Arc::clone(&f);
            move |value: T| {
                f(&value);
                out.next(value);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use std::sync::Mutex;

    #[tokio::test]
    async fn test_map_preserves_order() {
        let lens = Sequence::from_values(["Garfield", "Kojak", "Barbossa"]).map(str::len);
        assert_eq!(lens.collect().await, Ok(vec![8, 5, 8]));
    }

    #[tokio::test]
    async fn test_try_map_stops_at_first_error() {
        let pulled = Arc::new(Mutex::new(Vec::new()));
        let p = pulled.clone();
        let source = Sequence::from_lazy_source(move || {
            let p = p.clone();
            (1..=5).inspect(move |v| p.lock().unwrap().push(*v))
        });
        let parsed = source.try_map(|v: i32| {
            if v == 3 {
                Err(SequenceError::invalid_argument("three"))
            } else {
                Ok(v * 10)
            }
        });

        let items: Vec<_> = parsed.into_stream().collect().await;
        assert_eq!(
            items,
            vec![Ok(10), Ok(20), Err(SequenceError::invalid_argument("three"))]
        );
        assert_eq!(*pulled.lock().unwrap(), vec![1, 2, 3], "upstream stops after the error");
    }

    #[tokio::test]
    async fn test_filter_and_inspect() {
        let inspected = Arc::new(Mutex::new(Vec::new()));
        let i = inspected.clone();
        let evens = Sequence::range(1, 6)
            .unwrap()
            .inspect(move |v| i.lock().unwrap().push(*v))
            .filter(|v| v % 2 == 0);

        assert_eq!(evens.collect().await, Ok(vec![2, 4, 6]));
        assert_eq!(*inspected.lock().unwrap(), vec![1, 2, 3, 4, 5, 6]);
    }

    #[tokio::test]
    async fn test_errors_pass_through() {
        let seq = Sequence::<i32>::failed(SequenceError::upstream("io")).map(|v| v + 1);
        assert_eq!(seq.collect().await, Err(SequenceError::upstream("io")));
    }
}
