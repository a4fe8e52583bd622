//! Integration test: nodes failing to open, misbehaving during sweeps, or
//! disappearing without notice.

use ringcache_integration_tests::{Faults, IntegrationCluster};
use ringcache_store::{FaultOp, NodeConnection};

/// A node that cannot be opened holds ring slots but receives nothing.
#[tokio::test]
#[ntest::timeout(10000)]
async fn test_unopenable_node_swallows_its_keys() {
    let c = IntegrationCluster::with_replicas(3, 8);
    c.set_faults(
        2,
        Faults {
            ops: vec![FaultOp::Open],
            ..Faults::default()
        },
    );
    c.join_all().await;

    assert_eq!(c.cache().active_nodes().await.len(), 2);
    assert_eq!(c.cache().ring_replica_count().await, 24);

    let entries = c.write_keys(300).await;
    let mut owned_by_dead = 0;
    for (key, _) in &entries {
        if c.owner_index(key).await == Some(2) {
            owned_by_dead += 1;
        }
    }
    assert!(owned_by_dead > 0);
    assert_eq!(c.readable(&entries).await, entries.len() - owned_by_dead);

    // Once it comes up, a fresh join connects it without re-placing it.
    c.set_faults(2, Faults::default());
    c.join(2).await;
    assert_eq!(c.cache().active_nodes().await.len(), 3);
    assert_eq!(c.cache().ring_replica_count().await, 24);

    c.stop().await;
}

/// Ungraceful leave loses exactly the keys held by the departed node.
#[tokio::test]
#[ntest::timeout(10000)]
async fn test_leave_loses_only_departed_keys() {
    let c = IntegrationCluster::with_replicas(4, 16);
    c.join_all().await;
    let entries = c.write_keys(400).await;

    let lost = c.connection(3).unwrap().keys().await.unwrap().len();
    assert!(lost > 0);

    c.leave(3).await;
    assert_eq!(c.readable(&entries).await, entries.len() - lost);

    c.stop().await;
}

/// Random write failures on the new owner lose some keys during a join,
/// but never the ones that stay put.
#[tokio::test]
#[ntest::timeout(10000)]
async fn test_flaky_target_during_join() {
    let c = IntegrationCluster::with_replicas(3, 16);
    c.set_faults(
        2,
        Faults {
            rate: 0.5,
            seed: 7,
            ..Faults::default()
        },
    );
    c.join(0).await;
    c.join(1).await;
    let entries = c.write_keys(300).await;

    c.join(2).await;

    let mut stayed = 0;
    for (key, value) in &entries {
        if c.owner_index(key).await != Some(2) {
            stayed += 1;
            let owner = c.owner_index(key).await.unwrap();
            let held = c
                .connection(owner)
                .unwrap()
                .get(key)
                .await
                .unwrap();
            assert_eq!(held.as_ref(), Some(value), "{key} lost although it did not move");
        }
    }
    let on_new = c.connection(2).unwrap().keys().await.unwrap().len();
    assert!(on_new < entries.len() - stayed, "no write to the flaky node failed");

    c.stop().await;
}

/// A node whose enumeration fails is skipped and keeps its keys.
#[tokio::test]
#[ntest::timeout(10000)]
async fn test_unlistable_node_keeps_keys_on_shutdown() {
    let c = IntegrationCluster::with_replicas(2, 8);
    c.join_all().await;
    let entries = c.write_keys(100).await;

    let conn = c.connection(1).unwrap();
    let stranded = conn.keys().await.unwrap().len();
    conn.set_failing(FaultOp::Keys, true);

    c.shutdown(1).await;
    assert_eq!(c.readable(&entries).await, entries.len() - stranded);

    c.stop().await;
}
