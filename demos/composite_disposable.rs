//! Collects subscriptions from unrelated observables and disposes them together.
//!
//! To run this example, execute `cargo run --example composite_disposable`.

use std::time::Duration;

use rxlite::subscribe::Subscriber;
use rxlite::{CompositeDisposable, Disposable, Observable, Subscribeable};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .init();

    let subscriptions = CompositeDisposable::new();

    let ticks = Observable::interval(Duration::from_millis(100))
        .subscribe(Subscriber::on_next(|v| println!("tick {}", v)));
    subscriptions.add(ticks.clone());
    subscriptions.add(Observable::<u64>::never().subscribe(Subscriber::empty()));

    std::thread::sleep(Duration::from_millis(350));
    println!("disposing {} subscriptions", subscriptions.len());
    subscriptions.dispose();

    if ticks.join().is_err() {
        eprintln!("interval worker panicked");
    }

    // The composite can be reused after a dispose-all.
    subscriptions.add(Observable::<u64>::never().subscribe(Subscriber::empty()));
    println!("{} subscription(s) held after reuse", subscriptions.len());
}
