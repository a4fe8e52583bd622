//! Shared test utilities for ringcache-engine tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use ringcache_placement::{HashRing, Murmur3Hasher};
use ringcache_store::{
    CategoryFactory, ConnectionError, ConnectionFactory, FaultOp, FlakyConnection, NodeConnection,
};
use ringcache_types::{Node, NodeCategory, NodeId};

use crate::orchestrator::CacheOrchestrator;

pub const REPLICAS: usize = 4;

/// Node with a deterministic id.
pub fn node(n: u8, category: NodeCategory) -> Node {
    Node::new(NodeId::from([n; 32]), format!("host{n}"), 7000 + n as u16, category)
}

pub fn value(s: &str) -> Bytes {
    Bytes::from(s.to_string())
}

pub fn keys(total: usize) -> Vec<String> {
    (0..total).map(|i| format!("key-{i:04}")).collect()
}

/// Orchestrator with an empty murmur3 ring and in-memory connections.
pub fn cache() -> CacheOrchestrator {
    cache_with(Arc::new(CategoryFactory::in_memory()))
}

pub fn cache_with(factory: Arc<dyn ConnectionFactory>) -> CacheOrchestrator {
    let ring = HashRing::new(REPLICAS, Arc::new(Murmur3Hasher)).unwrap();
    CacheOrchestrator::new(ring, factory)
}

/// Factory that wraps every in-memory connection in a [`FlakyConnection`],
/// applies faults configured per node, and keeps a handle to each
/// connection it builds.
#[derive(Default)]
pub struct TestFactory {
    inner: CategoryFactory,
    faults: Mutex<HashMap<NodeId, Vec<FaultOp>>>,
    created: Mutex<HashMap<NodeId, Arc<FlakyConnection>>>,
}

impl TestFactory {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: CategoryFactory::in_memory(),
            ..Self::default()
        })
    }

    /// Faults applied to the next connection built for `node_id`.
    pub fn set_faults(&self, node_id: NodeId, ops: &[FaultOp]) {
        self.faults.lock().unwrap().insert(node_id, ops.to_vec());
    }

    /// The last connection built for `node_id`.
    pub fn connection(&self, node_id: &NodeId) -> Arc<FlakyConnection> {
        self.created.lock().unwrap()[node_id].clone()
    }
}

impl ConnectionFactory for TestFactory {
    fn create_for(&self, node: &Node) -> Result<Arc<dyn NodeConnection>, ConnectionError> {
        let inner = self.inner.create_for(node)?;
        let mut flaky = FlakyConnection::new(inner);
        if let Some(ops) = self.faults.lock().unwrap().get(&node.id) {
            for op in ops {
                flaky = flaky.fail(*op);
            }
        }
        let flaky = Arc::new(flaky);
        self.created.lock().unwrap().insert(node.id, flaky.clone());
        Ok(flaky)
    }
}

/// Keys physically held by a connection, sorted.
pub async fn held_keys(conn: &dyn NodeConnection) -> Vec<String> {
    let mut keys = conn.keys().await.unwrap();
    keys.sort();
    keys
}
