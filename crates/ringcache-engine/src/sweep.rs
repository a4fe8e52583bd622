//! Redistribution sweep.
//!
//! A sweep walks the keys stored on one node, recomputes each key's owner
//! against a ring snapshot, and moves every key whose owner changed:
//! read from the old node, write to the new owner, invalidate on the old
//! node. The three steps are independent; each one logs its failure and
//! the sweep carries on with the next key.

use std::collections::HashMap;
use std::ops::AddAssign;
use std::sync::Arc;

use ringcache_placement::HashRing;
use ringcache_store::NodeConnection;
use ringcache_types::{Node, NodeId};
use tracing::{debug, error, warn};

/// Open connections a sweep may move values to, keyed by node.
pub(crate) type Targets = HashMap<NodeId, Arc<dyn NodeConnection>>;

/// Outcome counters of one or more sweeps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Nodes whose keys were enumerated.
    pub nodes: usize,
    /// Keys examined.
    pub scanned: usize,
    /// Keys written to their new owner.
    pub moved: usize,
    /// Keys left in place because the ring had no owner.
    pub orphaned: usize,
    /// Keys left in place because the new owner has no open connection.
    pub unreachable: usize,
    /// Failed steps (enumerate, read, write or invalidate).
    pub failed: usize,
}

impl AddAssign for SweepReport {
    fn add_assign(&mut self, other: Self) {
        self.nodes += other.nodes;
        self.scanned += other.scanned;
        self.moved += other.moved;
        self.orphaned += other.orphaned;
        self.unreachable += other.unreachable;
        self.failed += other.failed;
    }
}

/// Move every key on `source` whose owner in `ring` is no longer
/// `source_id`.
pub(crate) async fn sweep_node(
    source_id: NodeId,
    source: &Arc<dyn NodeConnection>,
    ring: &HashRing<Node>,
    targets: &Targets,
) -> SweepReport {
    let mut report = SweepReport {
        nodes: 1,
        ..SweepReport::default()
    };

    let keys = match source.keys().await {
        Ok(keys) => keys,
        Err(e) => {
            error!(node_id = %source_id, %e, "could not enumerate keys, skipping node");
            report.failed += 1;
            return report;
        }
    };

    for key in keys {
        report.scanned += 1;

        let Some(owner) = ring.lookup(&key).map(|n| n.id) else {
            warn!(%key, node_id = %source_id, "no active nodes to transfer to, value left in place");
            report.orphaned += 1;
            continue;
        };

        if owner == source_id {
            continue;
        }

        let Some(target) = targets.get(&owner) else {
            warn!(%key, from = %source_id, to = %owner, "new owner has no open connection, value left in place");
            report.unreachable += 1;
            continue;
        };

        migrate(&key, source_id, source, owner, target, &mut report).await;
    }

    report
}

async fn migrate(
    key: &str,
    from: NodeId,
    source: &Arc<dyn NodeConnection>,
    to: NodeId,
    target: &Arc<dyn NodeConnection>,
    report: &mut SweepReport,
) {
    let value = match source.get(key).await {
        Ok(Some(value)) => value,
        Ok(None) => {
            debug!(key, %from, "value vanished before it could be moved");
            return;
        }
        Err(e) => {
            error!(key, %from, %e, "could not read value from old node");
            report.failed += 1;
            return;
        }
    };

    match target.put(key, value).await {
        Ok(()) => {
            debug!(key, %from, %to, "moved value");
            report.moved += 1;
        }
        Err(e) => {
            error!(key, %to, %e, "could not write value to new node");
            report.failed += 1;
        }
    }

    // Runs even when the write failed; the value is then lost.
    if let Err(e) = source.invalidate(key).await {
        error!(key, %from, %e, "could not invalidate value on old node");
        report.failed += 1;
    }
}
