//! Walks through the basic factories: `of`, `from_sequence`, `empty`, `never`,
//! `range`, `create` and `defer`.
//!
//! To run this example, execute `cargo run --example basic_operators`.
//! Set `RUST_LOG=rxlite=trace` to see subscription lifecycle events.

use std::error::Error;

use rxlite::subscribe::Subscriber;
use rxlite::{Disposable, Observable, Observer, Subscribeable};

fn printer(label: &'static str) -> Subscriber<String> {
    let mut observer = Subscriber::on_next(move |v| println!("[{}] {}", label, v));
    observer.on_complete(move || println!("[{}] completed", label));
    observer.on_error(move |e| eprintln!("[{}] error: {}", label, e));
    observer
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Prints 1, 2 and 3. Nothing runs before `subscribe`.
    Observable::of([1, 2, 3]).subscribe(Subscriber::on_next(|v| println!("{}", v)));

    let words = vec!["alpha".to_string(), "beta".to_string()];
    Observable::from_sequence(words).subscribe(printer("from_sequence"));

    Observable::empty().subscribe(printer("empty"));

    // `never` has no terminal signal, the subscription must be disposed.
    let forever = Observable::never().subscribe(printer("never"));
    forever.dispose();

    Observable::range(1, 10)?.subscribe(Subscriber::on_next(|v| println!("[range] {}", v)));
    if let Err(e) = Observable::range(1, -1) {
        println!("[range] rejected: {}", e);
    }

    // This producer never completes, so its subscription stays live until it is
    // disposed.
    let live = Observable::create(|mut o: Subscriber<String>| {
        o.next("1".to_string());
        o.next("?".to_string());
    })
    .subscribe(printer("create"));
    println!("[create] disposed before dispose(): {}", live.is_disposed());
    live.dispose();

    // The factory owns its toggle, so consecutive subscriptions alternate.
    let mut show_first = false;
    let mut alternating = Observable::defer(move || {
        show_first = !show_first;
        if show_first {
            Observable::of(["first set".to_string()])
        } else {
            Observable::of(["second set".to_string()])
        }
    });
    for _ in 0..3 {
        alternating.subscribe(printer("defer"));
    }

    Ok(())
}
