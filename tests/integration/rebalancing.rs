//! Integration test: how keys spread and move as the ring changes.

use ringcache_integration_tests::IntegrationCluster;
use ringcache_store::NodeConnection;

const KEYS: usize = 2000;

/// With enough replica points every node takes a share of the keys.
#[tokio::test]
#[ntest::timeout(30000)]
async fn test_keys_spread_over_all_nodes() {
    let c = IntegrationCluster::with_replicas(5, 64);
    c.join_all().await;
    c.write_keys(KEYS).await;

    let mut total = 0;
    for i in 0..c.len() {
        let held = c.connection(i).unwrap().keys().await.unwrap().len();
        assert!(held > KEYS / 20, "node {i} holds only {held} keys");
        total += held;
    }
    assert_eq!(total, KEYS);

    c.stop().await;
}

/// A join moves only the keys the new node now owns.
#[tokio::test]
#[ntest::timeout(30000)]
async fn test_join_moves_a_fraction() {
    let c = IntegrationCluster::with_replicas(6, 64);
    for i in 0..5 {
        c.join(i).await;
    }
    let entries = c.write_keys(KEYS).await;

    let mut before = Vec::new();
    for (key, _) in &entries {
        before.push(c.owner_index(key).await);
    }

    c.join(5).await;

    let mut moved = 0;
    for ((key, _), old) in entries.iter().zip(&before) {
        let new = c.owner_index(key).await;
        if new != *old {
            assert_eq!(new, Some(5), "{key} moved between existing nodes");
            moved += 1;
        }
    }
    assert!(moved > 0);
    assert!(moved < KEYS / 2, "{moved} keys moved on a single join");

    let held = c.connection(5).unwrap().keys().await.unwrap().len();
    assert_eq!(held, moved);
    assert_eq!(c.readable(&entries).await, KEYS);

    c.stop().await;
}

/// Shutting nodes down one by one keeps every key until one node is left.
#[tokio::test]
#[ntest::timeout(30000)]
async fn test_shutdown_cascade_keeps_all_keys() {
    let c = IntegrationCluster::with_replicas(5, 16);
    c.join_all().await;
    let entries = c.write_keys(500).await;

    for i in (1..5).rev() {
        c.shutdown(i).await;
        assert_eq!(c.readable(&entries).await, entries.len(), "after shutdown of node {i}");
        assert_eq!(c.cache().ring_replica_count().await, 16 * i);
    }

    let held = c.connection(0).unwrap().keys().await.unwrap().len();
    assert_eq!(held, entries.len());

    c.stop().await;
}
