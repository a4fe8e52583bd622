//! In-memory node connection.

use std::collections::HashMap;
use std::sync::RwLock;

use bytes::Bytes;
use ringcache_types::Node;
use tracing::{debug, info};

use crate::error::ConnectionError;
use crate::traits::NodeConnection;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Created,
    Open,
    Closed,
}

struct State {
    phase: Phase,
    entries: HashMap<String, Bytes>,
}

/// In-process stand-in for a storage node, backed by a `RwLock<HashMap>`.
///
/// Operations fail with [`ConnectionError::NotOpen`] before
/// [`open`](NodeConnection::open) and with [`ConnectionError::Closed`] after
/// [`close`](NodeConnection::close). Closing drops every stored value.
pub struct MemoryConnection {
    node: Node,
    state: RwLock<State>,
}

impl MemoryConnection {
    /// Create an unopened connection for `node`.
    pub fn new(node: Node) -> Self {
        Self {
            node,
            state: RwLock::new(State {
                phase: Phase::Created,
                entries: HashMap::new(),
            }),
        }
    }

    /// Number of values currently held.
    pub fn len(&self) -> usize {
        self.state.read().expect("lock poisoned").entries.len()
    }

    /// Whether the node holds no values.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_open(&self, phase: Phase) -> Result<(), ConnectionError> {
        match phase {
            Phase::Open => Ok(()),
            Phase::Created => Err(ConnectionError::NotOpen(self.node.id)),
            Phase::Closed => Err(ConnectionError::Closed(self.node.id)),
        }
    }
}

#[async_trait::async_trait]
impl NodeConnection for MemoryConnection {
    fn node(&self) -> &Node {
        &self.node
    }

    async fn open(&self) -> Result<(), ConnectionError> {
        let mut state = self.state.write().expect("lock poisoned");
        if state.phase == Phase::Closed {
            return Err(ConnectionError::Closed(self.node.id));
        }
        state.phase = Phase::Open;
        info!(node_id = %self.node.id, addr = %self.node.address(), "opened in-memory connection");
        Ok(())
    }

    async fn put(&self, key: &str, value: Bytes) -> Result<(), ConnectionError> {
        let mut state = self.state.write().expect("lock poisoned");
        self.check_open(state.phase)?;
        debug!(node_id = %self.node.id, key, size = value.len(), "put");
        state.entries.insert(key.to_string(), value);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Bytes>, ConnectionError> {
        let state = self.state.read().expect("lock poisoned");
        self.check_open(state.phase)?;
        debug!(node_id = %self.node.id, key, "get");
        Ok(state.entries.get(key).cloned())
    }

    async fn invalidate(&self, key: &str) -> Result<(), ConnectionError> {
        let mut state = self.state.write().expect("lock poisoned");
        self.check_open(state.phase)?;
        debug!(node_id = %self.node.id, key, "invalidate");
        state.entries.remove(key);
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>, ConnectionError> {
        let state = self.state.read().expect("lock poisoned");
        self.check_open(state.phase)?;
        Ok(state.entries.keys().cloned().collect())
    }

    async fn close(&self) -> Result<(), ConnectionError> {
        let mut state = self.state.write().expect("lock poisoned");
        state.phase = Phase::Closed;
        state.entries.clear();
        info!(node_id = %self.node.id, "closed in-memory connection");
        Ok(())
    }
}
