//! `take(n)`: forward the first `n` values, then complete and cancel upstream.

use crate::sequence::{Emitter, Sequence};

impl<T: Send + 'static> Sequence<T> {
    /// Emits at most `n` values, then completes.
    ///
    /// Reaching the limit cancels the upstream run, releasing its timers.
    /// `take(0)` completes without subscribing upstream. An upstream that ends
    /// before `n` values ends the result the same way.
    pub fn take(&self, n: usize) -> Sequence<T> {
        if n == 0 {
            return Sequence::empty();
        }
        self.relay(move |out: Emitter<T>| {
            let mut remaining = n;
            move |value: T| {
                if remaining == 0 {
                    return;
                }
                remaining -= 1;
                out.next(value);
                if remaining == 0 {
                    // Closing downstream cancels the derived upstream token.
                    out.complete();
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    #[tokio::test]
    async fn test_take_limits_and_stops_source() {
        let pulled = Arc::new(AtomicUsize::new(0));
        let p = pulled.clone();
        let seq = Sequence::from_lazy_source(move || {
            let p = p.clone();
            (0..1_000).inspect(move |_| {
                p.fetch_add(1, Ordering::SeqCst);
            })
        })
        .take(3);

        assert_eq!(seq.collect().await, Ok(vec![0, 1, 2]));
        assert_eq!(pulled.load(Ordering::SeqCst), 3, "source stops pulling once take is satisfied");
    }

    #[tokio::test]
    async fn test_take_zero_never_subscribes() {
        let subscribed = Arc::new(AtomicUsize::new(0));
        let s = subscribed.clone();
        let seq = Sequence::<i32>::create(move |emitter| {
            s.fetch_add(1, Ordering::SeqCst);
            emitter.complete();
        })
        .take(0);

        assert_eq!(seq.collect().await, Ok(vec![]));
        assert_eq!(subscribed.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_take_more_than_available() {
        let seq = Sequence::from_values(["a", "b"]).take(10);
        assert_eq!(seq.collect().await, Ok(vec!["a", "b"]));
    }

    #[test]
    fn test_take_completes_once() {
        let completions = Arc::new(Mutex::new(0));
        let c = completions.clone();
        Sequence::range(0, 5)
            .unwrap()
            .take(5)
            .subscribe_with(|_| {}, |_| {}, move || *c.lock().unwrap() += 1);
        assert_eq!(*completions.lock().unwrap(), 1);
    }
}
