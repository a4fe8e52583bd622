//! Core trait for node connections.

use bytes::Bytes;
use ringcache_types::Node;

use crate::error::ConnectionError;

/// A connection to one storage node.
///
/// Connections are created unopened by a
/// [`ConnectionFactory`](crate::ConnectionFactory); the cache core calls
/// [`open`](Self::open) before routing any traffic to it and
/// [`close`](Self::close) when the node leaves. All implementations must be
/// `Send + Sync` for use across async tasks.
#[async_trait::async_trait]
pub trait NodeConnection: Send + Sync {
    /// The node this connection talks to.
    fn node(&self) -> &Node;

    /// Open the connection.
    async fn open(&self) -> Result<(), ConnectionError>;

    /// Store a value under `key`, replacing any previous value.
    async fn put(&self, key: &str, value: Bytes) -> Result<(), ConnectionError>;

    /// Retrieve the value under `key`. Returns `None` if not found.
    async fn get(&self, key: &str) -> Result<Option<Bytes>, ConnectionError>;

    /// Remove the value under `key`, if any.
    async fn invalidate(&self, key: &str) -> Result<(), ConnectionError>;

    /// Point-in-time snapshot of every key currently stored on the node.
    async fn keys(&self) -> Result<Vec<String>, ConnectionError>;

    /// Close the connection.
    async fn close(&self) -> Result<(), ConnectionError>;
}
