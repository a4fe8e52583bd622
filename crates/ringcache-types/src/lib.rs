//! Shared types and identifiers for ringcache.
//!
//! This crate defines the core types used across the ringcache workspace:
//! node identity ([`NodeId`], [`Node`], [`NodeCategory`]), membership
//! events ([`NodeEvent`]), and ring configuration ([`RingConfig`],
//! [`HashAlgorithm`]).

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Node identity
// ---------------------------------------------------------------------------

/// Globally unique identifier for a storage node.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct NodeId([u8; 32]);

impl NodeId {
    /// Create an ID by hashing arbitrary data with BLAKE3.
    pub fn from_data(data: &[u8]) -> Self {
        Self(blake3::hash(data).into())
    }

    /// Generate a fresh random ID.
    pub fn random() -> Self {
        Self(rand::random())
    }

    /// Return the raw 32-byte representation.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl From<[u8; 32]> for NodeId {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for NodeId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({self})")
    }
}

/// Category of a storage node. Selects which connection implementation
/// the connection factory builds for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeCategory {
    /// Category A nodes.
    A,
    /// Category B nodes.
    B,
}

impl fmt::Display for NodeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeCategory::A => f.write_str("A"),
            NodeCategory::B => f.write_str("B"),
        }
    }
}

/// A storage node known to the topology manager.
///
/// Immutable once created. Two nodes are equal when their ids are equal,
/// regardless of address or category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Unique identifier.
    pub id: NodeId,
    /// Hostname the node listens on.
    pub host: String,
    /// Port the node listens on.
    pub port: u16,
    /// Category used for connection dispatch.
    pub category: NodeCategory,
}

impl Node {
    /// Create a node descriptor.
    pub fn new(id: NodeId, host: impl Into<String>, port: u16, category: NodeCategory) -> Self {
        Self {
            id,
            host: host.into(),
            port,
            category,
        }
    }

    /// Create a node with a freshly generated random id.
    pub fn with_random_id(host: impl Into<String>, port: u16, category: NodeCategory) -> Self {
        Self::new(NodeId::random(), host, port, category)
    }

    /// `host:port` of the node.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Node {}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

// ---------------------------------------------------------------------------
// Membership events
// ---------------------------------------------------------------------------

/// Membership events published by the topology manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeEvent {
    /// A node has joined and should start receiving traffic.
    Joined(Node),
    /// A node disappeared without draining.
    Left(Node),
    /// A node is shutting down gracefully and must be drained.
    ShuttingDown(Node),
}

impl NodeEvent {
    /// The node this event refers to.
    pub fn node(&self) -> &Node {
        match self {
            NodeEvent::Joined(node) | NodeEvent::Left(node) | NodeEvent::ShuttingDown(node) => {
                node
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Hash function used to place nodes and keys on the ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// MurmurHash3 x86 32-bit, seed 0.
    #[default]
    Murmur3,
    /// CRC-32 (IEEE).
    Crc32,
    /// BLAKE3, truncated to its first 4 bytes.
    Blake3,
}

/// Hash ring parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RingConfig {
    /// Replica points placed on the ring per node. Must be at least 1.
    pub replicas: usize,
    /// Hash function for both node replicas and keys.
    pub hash: HashAlgorithm,
}

impl Default for RingConfig {
    fn default() -> Self {
        Self {
            replicas: 4,
            hash: HashAlgorithm::Murmur3,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
