//! Error types for node connections.

use ringcache_types::{NodeCategory, NodeId};

/// Errors that can occur while talking to a storage node.
///
/// The cache core treats every variant as an I/O failure of the node.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    /// An I/O error occurred.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The connection has not been opened yet.
    #[error("connection to node {0} is not open")]
    NotOpen(NodeId),

    /// The connection has been closed.
    #[error("connection to node {0} is closed")]
    Closed(NodeId),

    /// The node could not be reached.
    #[error("node {node_id} unreachable: {reason}")]
    Unreachable {
        /// The node that failed.
        node_id: NodeId,
        /// Human-readable cause.
        reason: String,
    },

    /// No connection constructor is registered for the node's category.
    #[error("unsupported node category: {0}")]
    UnsupportedCategory(NodeCategory),
}
