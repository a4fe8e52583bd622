//! Error types for ring construction.

/// Errors produced when building a [`HashRing`](crate::HashRing).
#[derive(Debug, thiserror::Error)]
pub enum RingError {
    /// The ring needs at least one replica point per node.
    #[error("invalid replica count {0}: must be at least 1")]
    InvalidReplicaCount(usize),

    /// The hash function produces more bits than the ring can order.
    #[error("hash function produces {bits} bits, at most {max} are supported")]
    HashTooWide {
        /// Output width of the rejected hash function.
        bits: u32,
        /// Maximum supported width.
        max: u32,
    },
}
