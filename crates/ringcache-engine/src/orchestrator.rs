//! [`CacheOrchestrator`]: routes keys to nodes and keeps placement correct
//! as membership changes.
//!
//! Locking:
//!
//! - the ring and the registry each sit behind their own `RwLock`, held only
//!   for map/ring access, never across node I/O;
//! - a membership mutex serializes join/leave/shutdown, so two sweeps never
//!   interleave and the ring and registry do not change under a sweep;
//! - a sweep gate is held shared by every routing call for its whole
//!   duration and exclusively by a membership change from the moment it
//!   touches the ring until its sweep completes. Client calls never observe
//!   a half-migrated cache and never race a migration on the same key.
//!
//! A sweep works on snapshots of the ring and registry, so neither lock is
//! held while values move.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use ringcache_placement::HashRing;
use ringcache_store::{ConnectionFactory, NodeConnection};
use ringcache_types::{Node, NodeId, RingConfig};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, warn};

use crate::engine::{NodeEventHandler, RemoteCache};
use crate::error::CacheError;
use crate::sweep::{SweepReport, Targets, sweep_node};

/// Distributed cache front end over a dynamic set of storage nodes.
pub struct CacheOrchestrator {
    /// Consistent hashing ring of known nodes.
    ring: RwLock<HashRing<Node>>,
    /// Open connections, keyed by node.
    registry: RwLock<HashMap<NodeId, Arc<dyn NodeConnection>>>,
    /// Held for the whole of every membership change.
    membership: Mutex<()>,
    /// Shared by routing calls, exclusive while the ring changes and a
    /// sweep runs.
    sweep_gate: RwLock<()>,
    /// Builds connections for joining nodes.
    factory: Arc<dyn ConnectionFactory>,
}

impl CacheOrchestrator {
    /// Create an orchestrator over an (usually empty) ring.
    pub fn new(ring: HashRing<Node>, factory: Arc<dyn ConnectionFactory>) -> Self {
        Self {
            ring: RwLock::new(ring),
            registry: RwLock::new(HashMap::new()),
            membership: Mutex::new(()),
            sweep_gate: RwLock::new(()),
            factory,
        }
    }

    /// Create an orchestrator with an empty ring built from `config`.
    pub fn from_config(
        config: &RingConfig,
        factory: Arc<dyn ConnectionFactory>,
    ) -> Result<Self, CacheError> {
        Ok(Self::new(HashRing::from_config(config)?, factory))
    }

    // ------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------

    /// Ids of nodes with an open connection.
    pub async fn active_nodes(&self) -> Vec<NodeId> {
        self.registry.read().await.keys().copied().collect()
    }

    /// Whether `node_id` has an open connection.
    pub async fn is_active(&self, node_id: &NodeId) -> bool {
        self.registry.read().await.contains_key(node_id)
    }

    /// Nodes currently placed on the ring, connected or not.
    pub async fn ring_nodes(&self) -> Vec<Node> {
        self.ring.read().await.members()
    }

    /// Total replica points on the ring.
    pub async fn ring_replica_count(&self) -> usize {
        self.ring.read().await.len()
    }

    /// The node that currently owns `key`, if any.
    pub async fn owner_of(&self, key: &str) -> Option<Node> {
        self.ring.read().await.lookup(key).cloned()
    }

    // ------------------------------------------------------------------
    // Routing
    // ------------------------------------------------------------------

    /// Resolve the open connection of the node owning `key`.
    async fn connection_for(&self, key: &str) -> Option<Arc<dyn NodeConnection>> {
        let owner = self.ring.read().await.lookup(key).map(|n| n.id)?;
        let conn = self.registry.read().await.get(&owner).cloned();
        if conn.is_none() {
            debug!(key, %owner, "owner has no open connection");
        }
        conn
    }

    // ------------------------------------------------------------------
    // Membership
    // ------------------------------------------------------------------

    /// Connect `node` and redistribute keys across every active node.
    ///
    /// Fails with [`ConnectionError::UnsupportedCategory`] before touching
    /// the ring when the factory cannot serve the node. When the connection
    /// fails to open the node stays on the ring without a connection and
    /// the error is returned.
    ///
    /// [`ConnectionError::UnsupportedCategory`]: ringcache_store::ConnectionError::UnsupportedCategory
    pub async fn try_join(&self, node: Node) -> Result<SweepReport, CacheError> {
        let _membership = self.membership.lock().await;

        if self.is_active(&node.id).await {
            warn!(node_id = %node.id, "node already active, ignoring join");
            return Ok(SweepReport::default());
        }

        let conn = self.factory.create_for(&node)?;

        let _gate = self.sweep_gate.write().await;
        {
            let mut ring = self.ring.write().await;
            // A node whose earlier open failed is still on the ring.
            if !ring.contains(&node) {
                ring.store(node.clone());
            }
        }

        conn.open().await?;
        self.registry.write().await.insert(node.id, conn);
        info!(node_id = %node.id, addr = %node.address(), category = %node.category, "node joined");

        let report = self.redistribute_all().await;
        info!(
            node_id = %node.id,
            scanned = report.scanned,
            moved = report.moved,
            failed = report.failed,
            "redistribution after join complete"
        );
        Ok(report)
    }

    /// Forget `node` without draining it. Returns whether it had an open
    /// connection.
    pub async fn remove_node(&self, node: &Node) -> bool {
        let _membership = self.membership.lock().await;

        let (points, conn) = {
            let _gate = self.sweep_gate.write().await;
            self.detach(node).await
        };
        if points == 0 && conn.is_none() {
            debug!(node_id = %node.id, "unknown node, nothing to remove");
            return false;
        }
        info!(node_id = %node.id, points, connected = conn.is_some(), "node removed");

        match conn {
            Some(conn) => {
                close_soft(node, conn.as_ref()).await;
                true
            }
            None => false,
        }
    }

    /// Stop routing to `node`, move its keys to their new owners, then
    /// close its connection.
    pub async fn drain_node(&self, node: &Node) -> SweepReport {
        let _membership = self.membership.lock().await;

        let gate = self.sweep_gate.write().await;
        let (_, conn) = self.detach(node).await;
        let Some(conn) = conn else {
            warn!(node_id = %node.id, "node has no open connection, nothing to drain");
            return SweepReport::default();
        };
        info!(node_id = %node.id, "draining node");

        let ring = self.ring.read().await.clone();
        let targets = self.targets().await;
        let report = sweep_node(node.id, &conn, &ring, &targets).await;
        drop(gate);

        close_soft(node, conn.as_ref()).await;
        info!(
            node_id = %node.id,
            scanned = report.scanned,
            moved = report.moved,
            orphaned = report.orphaned,
            failed = report.failed,
            "node drained"
        );
        report
    }

    /// Take `node` off the ring and out of the registry. Returns the number
    /// of replica points removed and the node's connection, if it had one.
    async fn detach(&self, node: &Node) -> (usize, Option<Arc<dyn NodeConnection>>) {
        let points = self.ring.write().await.remove(node);
        (points, self.registry.write().await.remove(&node.id))
    }

    /// Snapshot of the registry.
    async fn targets(&self) -> Targets {
        self.registry.read().await.clone()
    }

    /// Sweep every active node against the current ring, in node id order.
    async fn redistribute_all(&self) -> SweepReport {
        let ring = self.ring.read().await.clone();
        let targets = self.targets().await;

        let mut order: Vec<_> = targets.iter().collect();
        order.sort_by_key(|(node_id, _)| **node_id);

        let mut total = SweepReport::default();
        for (node_id, conn) in order {
            total += sweep_node(*node_id, conn, &ring, &targets).await;
        }
        total
    }
}

async fn close_soft(node: &Node, conn: &dyn NodeConnection) {
    if let Err(e) = conn.close().await {
        warn!(node_id = %node.id, %e, "could not close connection");
    }
}

#[async_trait::async_trait]
impl RemoteCache for CacheOrchestrator {
    async fn put(&self, key: &str, value: Bytes) -> Result<(), CacheError> {
        let _gate = self.sweep_gate.read().await;
        match self.connection_for(key).await {
            Some(conn) => Ok(conn.put(key, value).await?),
            None => {
                debug!(key, "no node to store value on, dropping put");
                Ok(())
            }
        }
    }

    async fn get(&self, key: &str) -> Result<Option<Bytes>, CacheError> {
        let _gate = self.sweep_gate.read().await;
        match self.connection_for(key).await {
            Some(conn) => Ok(conn.get(key).await?),
            None => Ok(None),
        }
    }

    async fn invalidate(&self, key: &str) -> Result<(), CacheError> {
        let _gate = self.sweep_gate.read().await;
        match self.connection_for(key).await {
            Some(conn) => Ok(conn.invalidate(key).await?),
            None => Ok(()),
        }
    }
}

#[async_trait::async_trait]
impl NodeEventHandler for CacheOrchestrator {
    async fn join(&self, node: Node) {
        let node_id = node.id;
        if let Err(e) = self.try_join(node).await {
            error!(%node_id, %e, "could not join node");
        }
    }

    async fn leave(&self, node: Node) {
        self.remove_node(&node).await;
    }

    async fn shutdown(&self, node: Node) {
        self.drain_node(&node).await;
    }
}

impl std::fmt::Debug for CacheOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheOrchestrator").finish_non_exhaustive()
    }
}
