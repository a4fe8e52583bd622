//! Contracts exposed by the cache core.
//!
//! Clients depend on [`RemoteCache`] for data traffic; the topology manager
//! depends on [`NodeEventHandler`] to report membership changes. Both are
//! implemented by [`CacheOrchestrator`](crate::CacheOrchestrator).

use bytes::Bytes;
use ringcache_types::Node;

use crate::error::CacheError;

/// The data-plane interface exposed to cache clients.
///
/// When no node owns a key (or the owner has no open connection), `put` and
/// `invalidate` do nothing and `get` returns `None`. Connection failures are
/// returned to the caller and never retried.
#[async_trait::async_trait]
pub trait RemoteCache: Send + Sync {
    /// Store `value` under `key` on the owning node.
    async fn put(&self, key: &str, value: Bytes) -> Result<(), CacheError>;

    /// Retrieve the value under `key` from the owning node.
    async fn get(&self, key: &str) -> Result<Option<Bytes>, CacheError>;

    /// Remove the value under `key` from the owning node.
    async fn invalidate(&self, key: &str) -> Result<(), CacheError>;
}

/// Membership events reported by the topology manager.
///
/// Handlers never fail from the caller's point of view: errors are logged.
#[async_trait::async_trait]
pub trait NodeEventHandler: Send + Sync {
    /// A node joined: connect to it and move it the keys it now owns.
    async fn join(&self, node: Node);

    /// A node left without draining: forget it and close its connection.
    async fn leave(&self, node: Node);

    /// A node is shutting down: stop routing to it, drain its keys to their
    /// new owners, then close its connection.
    async fn shutdown(&self, node: Node);
}
