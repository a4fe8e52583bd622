//! Chaos test: seeded random sequences of joins and graceful shutdowns.
//!
//! As long as one node stays up and every departure is graceful, no key
//! may be lost and the ring must hold exactly one set of replica points
//! per member.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use ringcache_integration_tests::IntegrationCluster;

const NODES: usize = 8;
const REPLICAS: usize = 12;
const STEPS: usize = 40;

async fn churn(seed: u64) {
    let c = IntegrationCluster::with_replicas(NODES, REPLICAS);
    let mut rng = StdRng::seed_from_u64(seed);
    let mut up = vec![false; NODES];

    c.join(0).await;
    up[0] = true;
    let entries = c.write_keys(300).await;

    for step in 0..STEPS {
        let i = rng.random_range(0..NODES);
        let live = up.iter().filter(|u| **u).count();
        if up[i] {
            if live == 1 {
                continue;
            }
            c.shutdown(i).await;
            up[i] = false;
        } else {
            c.join(i).await;
            up[i] = true;
        }

        let live = up.iter().filter(|u| **u).count();
        assert_eq!(c.cache().active_nodes().await.len(), live, "seed {seed} step {step}");
        assert_eq!(
            c.cache().ring_replica_count().await,
            live * REPLICAS,
            "seed {seed} step {step}"
        );
        assert_eq!(
            c.readable(&entries).await,
            entries.len(),
            "seed {seed} step {step}: keys lost"
        );
    }

    c.stop().await;
}

#[tokio::test]
#[ntest::timeout(60000)]
async fn test_random_churn_seed_1() {
    churn(1).await;
}

#[tokio::test]
#[ntest::timeout(60000)]
async fn test_random_churn_seed_42() {
    churn(42).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ntest::timeout(60000)]
async fn test_random_churn_multi_thread() {
    churn(2024).await;
}
