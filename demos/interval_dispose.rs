//! Runs an `interval` on a Tokio task and stops it through its subscription.
//!
//! To run this example, execute `cargo run --example interval_dispose`.

use rxlite::subscribe::Subscriber;
use rxlite::{Disposable, Observable, Subscribeable};

use tokio::time::{sleep, Duration};

#[tokio::main()]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .init();

    let subscription = Observable::interval(Duration::from_millis(50))
        .subscribe(Subscriber::on_next(|v| println!("Emitted {}", v)));

    // Do something else here.
    sleep(Duration::from_millis(300)).await;

    // Dispose from a different task than the one producing values.
    let remote = subscription.clone();
    tokio::spawn(async move { remote.dispose() }).await.ok();

    if subscription.join_concurrent().await.is_err() {
        eprintln!("interval task failed");
    }
    println!("`main` function done")
}
