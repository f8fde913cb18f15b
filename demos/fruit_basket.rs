//! # Example: Sources
//!
//! Demonstrates the synchronous and timed sources:
//! - `just`, `from_values`, `from_collection`
//! - `from_lazy_source` (fresh iterator per subscription)
//! - `from_iterator` (one-shot: the second run fails)
//! - `range(1, 5)`
//! - `interval(1s).take(5)`
//!
//! ## Flow
//! ```text
//! from_values ──► subscribe ──► Apple, Orange, ... ──► complete
//! interval(1s) ──► take(5) ──► 0..=4 ──► complete (timer cancelled)
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example fruit_basket
//! ```

use std::time::Duration;

use flowseq::{Sequence, SequenceError};

const FRUITS: [&str; 5] = ["Apple", "Orange", "Grape", "Banana", "Strawberry"];

fn print_run<T: std::fmt::Debug + Send + 'static>(label: &'static str, seq: &Sequence<T>) {
    seq.subscribe_with(
        move |v| println!("[{label}] next {v:?}"),
        move |err| println!("[{label}] error {err}"),
        move || println!("[{label}] complete"),
    );
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), SequenceError> {
    print_run("just", &Sequence::just("Apple"));
    print_run("values", &Sequence::from_values(FRUITS));
    print_run(
        "collection",
        &Sequence::from_collection(FRUITS.iter().map(|f| f.to_string()).collect::<Vec<_>>()),
    );
    print_run("lazy", &Sequence::from_lazy_source(|| FRUITS.into_iter().rev()));

    let once = Sequence::from_iterator(FRUITS.into_iter());
    print_run("iterator#1", &once);
    print_run("iterator#2", &once);

    print_run("range", &Sequence::range(1, 5)?);

    let ticks = Sequence::interval(Duration::from_secs(1)).take(5).collect().await?;
    println!("[interval] ticks {ticks:?}");
    Ok(())
}
