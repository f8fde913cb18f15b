//! # Example: Merge Timeline
//!
//! Two delayed sequences merged into one, values printed with their arrival
//! time:
//!
//! ```text
//! t(ms)   0    250   500   750   1000  1250  1500  1750
//! pets    ├──────────Garfield────Kojak───────Barbossa
//! foods   ·    ├──────────Lasagna────Lollipops───Apples
//! merged            Garfield Lasagna Kojak Lollipops Barbossa Apples
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example merge_timeline
//! ```

use std::time::Duration;

use tokio::time::Instant;

use flowseq::{Sequence, SequenceError, merge};

#[tokio::main]
async fn main() -> Result<(), SequenceError> {
    let pets = Sequence::from_values(["Garfield", "Kojak", "Barbossa"])
        .delay_elements(Duration::from_millis(500));
    let foods = Sequence::from_values(["Lasagna", "Lollipops", "Apples"])
        .delay_subscription(Duration::from_millis(250))
        .delay_elements(Duration::from_millis(500));

    let start = Instant::now();
    let sub = merge(&pets, &foods).subscribe_with(
        move |name| println!("[{:>5}ms] {name}", start.elapsed().as_millis()),
        |err| println!("error: {err}"),
        || println!("complete"),
    );

    sub.closed().await;
    Ok(())
}
