//! Integration test: the reference client walk-through, driven by events.

use bytes::Bytes;
use ringcache_engine::RemoteCache;
use ringcache_integration_tests::IntegrationCluster;

fn v(s: &'static str) -> Option<Bytes> {
    Some(Bytes::from_static(s.as_bytes()))
}

#[tokio::test]
#[ntest::timeout(10000)]
async fn test_walkthrough_over_event_stream() {
    let c = IntegrationCluster::with_replicas(3, 4);
    let cache = c.cache();

    assert_eq!(cache.get("A").await.unwrap(), None);
    cache.put("A", Bytes::from_static(b"AValue")).await.unwrap();
    assert_eq!(cache.get("A").await.unwrap(), None);

    c.join(0).await;
    cache.put("A", Bytes::from_static(b"AValue")).await.unwrap();
    assert_eq!(cache.get("A").await.unwrap(), v("AValue"));
    cache.invalidate("A").await.unwrap();
    assert_eq!(cache.get("A").await.unwrap(), None);

    c.join(1).await;
    c.join(2).await;
    assert_eq!(cache.active_nodes().await.len(), 3);

    let entries = [("B", "BValue"), ("C", "CValue"), ("D", "DValue"), ("E", "EValue")];
    for (k, val) in entries {
        cache.put(k, Bytes::from_static(val.as_bytes())).await.unwrap();
    }
    for (k, val) in entries {
        assert_eq!(cache.get(k).await.unwrap(), v(val));
    }

    c.shutdown(1).await;
    for (k, val) in entries {
        assert_eq!(cache.get(k).await.unwrap(), v(val), "{k} after shutdown of node 1");
    }

    c.shutdown(2).await;
    for (k, val) in entries {
        assert_eq!(cache.get(k).await.unwrap(), v(val), "{k} after shutdown of node 2");
    }

    c.leave(0).await;
    for (k, _) in entries {
        assert_eq!(cache.get(k).await.unwrap(), None);
    }
    assert!(cache.active_nodes().await.is_empty());
    assert_eq!(cache.ring_replica_count().await, 0);

    c.stop().await;
}

#[tokio::test]
#[ntest::timeout(10000)]
async fn test_rejoin_after_leave_starts_empty() {
    let c = IntegrationCluster::with_replicas(2, 8);
    c.join_all().await;
    let entries = c.write_keys(50).await;

    c.leave(1).await;
    c.join(1).await;

    // Keys node 1 held went with its old connection.
    let readable = c.readable(&entries).await;
    assert!(readable < entries.len());
    let mut owned_by_0 = 0;
    for (key, _) in &entries {
        if c.owner_index(key).await == Some(0) {
            owned_by_0 += 1;
        }
    }
    assert_eq!(readable, owned_by_0);

    c.stop().await;
}
