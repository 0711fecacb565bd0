//! Wraps a one-shot fallible lookup into a `Single`.
//!
//! To run this example, execute `cargo run --example single_lookup`.

use std::{collections::HashMap, fmt, sync::Arc};

use rxlite::{Single, SingleSubscriber};

#[derive(Debug)]
struct NotFound(String);

impl fmt::Display for NotFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no entry named {}", self.0)
    }
}

impl std::error::Error for NotFound {}

fn find_port(services: Arc<HashMap<&'static str, u16>>, name: &'static str) -> Single<u16> {
    Single::create(move |mut emitter| match services.get(name) {
        Some(port) => emitter.success(*port),
        None => emitter.error(NotFound(name.to_string())),
    })
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let services = Arc::new(HashMap::from([("http", 80), ("ssh", 22)]));

    for name in ["ssh", "gopher"] {
        find_port(Arc::clone(&services), name).subscribe(SingleSubscriber::new(
            move |port| println!("{} listens on {}", name, port),
            |e| eprintln!("lookup failed: {}", e),
        ));
    }

    let mut parsed = Single::from_fallible(|| "8080".parse::<u16>());
    parsed.subscribe(SingleSubscriber::on_success(|v| println!("parsed {}", v)));
}
