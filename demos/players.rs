//! # Example: Concurrent FlatMap
//!
//! Each player name becomes an inner sequence subscribed on a worker of a
//! dedicated scheduler. Arrival order depends on the workers; every name
//! arrives exactly once, followed by one completion.
//!
//! ## Flow
//! ```text
//! Garfield ─┐                    ┌─► worker ─► GARFIELD ─┐
//! Kojak    ─┼─► flat_map_with(2) ┼─► worker ─► KOJAK    ─┼─► observer
//! Barbossa ─┘   (third queued)   └─► worker ─► BARBOSSA ─┘
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example players
//! ```

use std::time::Duration;

use tokio::runtime::Handle;

use flowseq::{Config, Scheduler, Sequence, SequenceError};

#[tokio::main(flavor = "multi_thread", worker_threads = 4)]
async fn main() -> Result<(), SequenceError> {
    let parallel = Scheduler::with_config(
        Handle::current(),
        Config::default().with_name("players").with_max_workers(4),
    );

    let workers = parallel.clone();
    let shouted = Sequence::from_values(["Garfield", "Kojak", "Barbossa"]).flat_map_with(
        move |player: &'static str| {
            Sequence::just(player)
                .delay_elements_on(Duration::from_millis(100), &workers)
                .map(|p| format!("{} ({:?})", p.to_uppercase(), std::thread::current().id()))
                .subscribe_on(&workers)
        },
        2,
    );

    let sub = shouted.subscribe_with(
        |line| println!("[player] {line}"),
        |err| println!("[player] error {err}"),
        || println!("[player] complete"),
    );
    sub.closed().await;
    println!("scheduler: {parallel:?}");
    Ok(())
}
