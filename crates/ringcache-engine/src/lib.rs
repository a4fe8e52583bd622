//! Cache orchestrator tying the ring and node connections together.
//!
//! The [`CacheOrchestrator`] owns the hash ring and the registry of open
//! node connections. It routes client traffic through the [`RemoteCache`]
//! trait and reacts to membership changes through the
//! [`NodeEventHandler`] trait, migrating stored values to their new owners
//! when a node joins or shuts down gracefully.
//!
//! Redistribution is best effort: a failure between reading, writing and
//! invalidating a value can leave it duplicated or lose it.

pub mod engine;
pub mod error;
pub mod events;
pub mod orchestrator;
pub mod sweep;

pub use engine::{NodeEventHandler, RemoteCache};
pub use error::CacheError;
pub use events::spawn_event_listener;
pub use orchestrator::CacheOrchestrator;
pub use sweep::SweepReport;

#[cfg(test)]
mod tests;
