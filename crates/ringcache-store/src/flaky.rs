//! A [`NodeConnection`] wrapper that injects failures.
//!
//! `FlakyConnection` wraps any `Arc<dyn NodeConnection>` and fails selected
//! operations, either always or at a random rate. The RNG is seeded for
//! deterministic, reproducible behaviour across test runs.
//!
//! # Example
//!
//! ```ignore
//! let flaky = FlakyConnection::new(inner)
//!     .fail(FaultOp::Open)      // node never comes up
//!     .failure_rate(0.25)       // 25% of data operations fail
//!     .seed(42);
//! ```

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use ringcache_types::Node;

use crate::error::ConnectionError;
use crate::traits::NodeConnection;

/// Operations that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultOp {
    /// [`NodeConnection::open`].
    Open,
    /// [`NodeConnection::put`].
    Put,
    /// [`NodeConnection::get`].
    Get,
    /// [`NodeConnection::invalidate`].
    Invalidate,
    /// [`NodeConnection::keys`].
    Keys,
    /// [`NodeConnection::close`].
    Close,
}

/// A [`NodeConnection`] wrapper that fails operations on demand.
///
/// Useful for exercising the soft-failure paths of redistribution and the
/// failed-open path of a join.
pub struct FlakyConnection {
    inner: Arc<dyn NodeConnection>,
    failing: Mutex<HashSet<FaultOp>>,
    failure_rate: f64,
    rng: Mutex<StdRng>,
}

impl FlakyConnection {
    /// Wrap an existing connection with no faults (pass-through) by default.
    pub fn new(inner: Arc<dyn NodeConnection>) -> Self {
        Self {
            inner,
            failing: Mutex::new(HashSet::new()),
            failure_rate: 0.0,
            rng: Mutex::new(StdRng::seed_from_u64(0)),
        }
    }

    /// Always fail `op`.
    pub fn fail(self, op: FaultOp) -> Self {
        self.set_failing(op, true);
        self
    }

    /// Fail put/get/invalidate at random with probability `rate`.
    pub fn failure_rate(mut self, rate: f64) -> Self {
        self.failure_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Set the RNG seed for deterministic behaviour.
    pub fn seed(self, seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            ..self
        }
    }

    /// Toggle a fault while the connection is in use.
    pub fn set_failing(&self, op: FaultOp, failing: bool) {
        let mut set = self.failing.lock().expect("lock poisoned");
        if failing {
            set.insert(op);
        } else {
            set.remove(&op);
        }
    }

    fn check(&self, op: FaultOp) -> Result<(), ConnectionError> {
        let forced = self.failing.lock().expect("lock poisoned").contains(&op);
        let random = matches!(op, FaultOp::Put | FaultOp::Get | FaultOp::Invalidate)
            && self.failure_rate > 0.0
            && self
                .rng
                .lock()
                .expect("lock poisoned")
                .random_bool(self.failure_rate);

        if forced || random {
            return Err(ConnectionError::Unreachable {
                node_id: self.inner.node().id,
                reason: format!("injected fault on {op:?}"),
            });
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl NodeConnection for FlakyConnection {
    fn node(&self) -> &Node {
        self.inner.node()
    }

    async fn open(&self) -> Result<(), ConnectionError> {
        self.check(FaultOp::Open)?;
        self.inner.open().await
    }

    async fn put(&self, key: &str, value: Bytes) -> Result<(), ConnectionError> {
        self.check(FaultOp::Put)?;
        self.inner.put(key, value).await
    }

    async fn get(&self, key: &str) -> Result<Option<Bytes>, ConnectionError> {
        self.check(FaultOp::Get)?;
        self.inner.get(key).await
    }

    async fn invalidate(&self, key: &str) -> Result<(), ConnectionError> {
        self.check(FaultOp::Invalidate)?;
        self.inner.invalidate(key).await
    }

    async fn keys(&self) -> Result<Vec<String>, ConnectionError> {
        self.check(FaultOp::Keys)?;
        self.inner.keys().await
    }

    async fn close(&self) -> Result<(), ConnectionError> {
        self.check(FaultOp::Close)?;
        self.inner.close().await
    }
}
