//! Consistent hashing ring implementation.

use std::sync::Arc;

use ringcache_types::{Node, RingConfig};
use tracing::debug;

use crate::error::RingError;
use crate::hasher::{MAX_HASH_BITS, RingHasher, hasher_for};

/// Something that can be placed on the ring.
///
/// The label is the member's external string form; replica identifiers are
/// built from it as `"{label}_{index}"`. Members are matched on removal
/// with `PartialEq`.
pub trait RingMember: Clone + PartialEq {
    /// String form used to derive replica positions.
    fn ring_label(&self) -> String;
}

impl RingMember for Node {
    fn ring_label(&self) -> String {
        self.id.to_string()
    }
}

impl RingMember for String {
    fn ring_label(&self) -> String {
        self.clone()
    }
}

/// One replica point on the ring.
#[derive(Debug, Clone)]
struct ReplicaPoint<N> {
    hash: u32,
    member: N,
    index: usize,
}

/// Consistent hashing ring.
///
/// Replica points are kept in a vector sorted ascending by hash. Points with
/// equal hashes keep their insertion order. Lookups binary-search the
/// vector for the first point at or after the key's hash, wrapping to the
/// first point when the key hashes past the end.
#[derive(Debug, Clone)]
pub struct HashRing<N> {
    points: Vec<ReplicaPoint<N>>,
    replicas: usize,
    hasher: Arc<dyn RingHasher>,
}

impl<N: RingMember> HashRing<N> {
    /// Create an empty ring placing `replicas` points per member.
    ///
    /// Fails if `replicas` is zero or if `hasher` produces more than
    /// [`MAX_HASH_BITS`] bits.
    pub fn new(replicas: usize, hasher: Arc<dyn RingHasher>) -> Result<Self, RingError> {
        if replicas < 1 {
            return Err(RingError::InvalidReplicaCount(replicas));
        }
        let bits = hasher.bits();
        if bits > MAX_HASH_BITS {
            return Err(RingError::HashTooWide {
                bits,
                max: MAX_HASH_BITS,
            });
        }
        Ok(Self {
            points: Vec::new(),
            replicas,
            hasher,
        })
    }

    /// Create an empty ring from configuration.
    pub fn from_config(config: &RingConfig) -> Result<Self, RingError> {
        Self::new(config.replicas, hasher_for(config.hash))
    }

    /// Place all replica points for `member`.
    pub fn store(&mut self, member: N) {
        let label = member.ring_label();
        for index in 0..self.replicas {
            let hash = self.position(format!("{label}_{index}").as_bytes());
            let at = self.points.partition_point(|p| p.hash <= hash);
            self.points.insert(
                at,
                ReplicaPoint {
                    hash,
                    member: member.clone(),
                    index,
                },
            );
        }
        debug!(%label, replicas = self.replicas, "stored member on ring");
    }

    /// Remove up to `R` replica points matching `member`, scanning in ring
    /// order. Returns how many points were removed; zero means the member
    /// was not on the ring and nothing changed.
    pub fn remove(&mut self, member: &N) -> usize {
        let cap = self.replicas;
        let mut removed = 0;
        self.points.retain(|p| {
            if removed < cap && p.member == *member {
                removed += 1;
                false
            } else {
                true
            }
        });
        if removed > 0 {
            debug!(label = %member.ring_label(), removed, "removed member from ring");
        }
        removed
    }

    /// Find the member owning `key`, or `None` if the ring is empty.
    pub fn lookup<K: AsRef<[u8]> + ?Sized>(&self, key: &K) -> Option<&N> {
        if self.points.is_empty() {
            return None;
        }
        let hash = self.position(key.as_ref());
        let mut at = self.points.partition_point(|p| p.hash < hash);
        if at == self.points.len() {
            at = 0;
        }
        Some(&self.points[at].member)
    }

    /// Whether any replica point of `member` is on the ring.
    pub fn contains(&self, member: &N) -> bool {
        self.points.iter().any(|p| p.member == *member)
    }

    /// Distinct members currently on the ring, in ring order of their
    /// first replica point.
    pub fn members(&self) -> Vec<N> {
        let mut members: Vec<N> = Vec::new();
        for point in &self.points {
            if !members.contains(&point.member) {
                members.push(point.member.clone());
            }
        }
        members
    }

    /// Number of distinct members on the ring.
    pub fn node_count(&self) -> usize {
        self.members().len()
    }

    /// Total number of replica points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the ring has no replica points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Replica points placed per member.
    pub fn replicas(&self) -> usize {
        self.replicas
    }

    /// Replica indices of `member` in ring order.
    pub fn replica_indices(&self, member: &N) -> Vec<usize> {
        self.points
            .iter()
            .filter(|p| p.member == *member)
            .map(|p| p.index)
            .collect()
    }

    fn position(&self, bytes: &[u8]) -> u32 {
        self.hasher.hash(bytes)
    }
}
