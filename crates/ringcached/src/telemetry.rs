//! Tracing initialization for the ringcache daemon.

use tracing_subscriber::EnvFilter;

/// Install a console subscriber.
///
/// `RUST_LOG` wins over `level` when set. Call once at startup, before any
/// `tracing` events are emitted.
pub fn init(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
