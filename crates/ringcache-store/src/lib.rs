//! Node connection contract and backend implementations.
//!
//! This crate defines the [`NodeConnection`] trait the cache core uses to
//! talk to a storage node, the [`ConnectionFactory`] trait that builds
//! unopened connections, and these implementations:
//!
//! - [`MemoryConnection`]: in-process stand-in backed by a `RwLock<HashMap>`.
//! - [`FlakyConnection`]: wrapper that injects failures, for tests.
//! - [`CategoryFactory`]: dispatch table from [`NodeCategory`] to a
//!   connection constructor.
//!
//! [`NodeCategory`]: ringcache_types::NodeCategory

mod error;
mod factory;
mod flaky;
mod memory;
mod traits;

pub use error::ConnectionError;
pub use factory::{CategoryFactory, ConnectionFactory, Constructor};
pub use flaky::{FaultOp, FlakyConnection};
pub use memory::MemoryConnection;
pub use traits::NodeConnection;
