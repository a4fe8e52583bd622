//! Consistent hashing ring for key-to-node ownership.
//!
//! This crate implements a consistent hash ring that maps arbitrary keys to
//! the node that owns them. Each node is placed on the ring as `R` replica
//! points, at `hash("{label}_{index}")` for `index` in `0..R`. A key belongs
//! to the first replica point at or after the key's own hash, wrapping
//! around to the start of the ring.
//!
//! Only the keys between two adjacent replica points change owner when a
//! node joins or leaves, so redistribution touches the boundary nodes only.

mod error;
mod hasher;
mod ring;

pub use error::RingError;
pub use hasher::{Blake3Hasher, Crc32Hasher, MAX_HASH_BITS, Murmur3Hasher, RingHasher, hasher_for};
pub use ring::{HashRing, RingMember};
