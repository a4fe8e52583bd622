//! Hash functions for placing replica points and keys on the ring.

use std::fmt;
use std::sync::Arc;

use ringcache_types::HashAlgorithm;

/// Widest hash output the ring accepts.
pub const MAX_HASH_BITS: u32 = 32;

/// A deterministic hash function used for both replica identifiers and keys.
///
/// Implementations report their output width through [`bits`](Self::bits);
/// the ring rejects anything wider than [`MAX_HASH_BITS`] at construction.
/// Positions are `u32` and ordered unsigned.
pub trait RingHasher: Send + Sync + fmt::Debug {
    /// Number of significant bits in the output of [`hash`](Self::hash).
    fn bits(&self) -> u32;

    /// Hash a byte string.
    fn hash(&self, bytes: &[u8]) -> u32;
}

/// MurmurHash3 x86 32-bit with seed 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct Murmur3Hasher;

impl RingHasher for Murmur3Hasher {
    fn bits(&self) -> u32 {
        32
    }

    fn hash(&self, bytes: &[u8]) -> u32 {
        let mut reader = bytes;
        murmur3::murmur3_32(&mut reader, 0).expect("reading a byte slice never fails")
    }
}

/// CRC-32 (IEEE polynomial).
#[derive(Debug, Clone, Copy, Default)]
pub struct Crc32Hasher;

impl RingHasher for Crc32Hasher {
    fn bits(&self) -> u32 {
        32
    }

    fn hash(&self, bytes: &[u8]) -> u32 {
        crc32fast::hash(bytes)
    }
}

/// BLAKE3 truncated to its first 4 bytes (little-endian).
#[derive(Debug, Clone, Copy, Default)]
pub struct Blake3Hasher;

impl RingHasher for Blake3Hasher {
    fn bits(&self) -> u32 {
        32
    }

    fn hash(&self, bytes: &[u8]) -> u32 {
        let hash = blake3::hash(bytes);
        let prefix: [u8; 4] = hash.as_bytes()[..4].try_into().expect("4 bytes");
        u32::from_le_bytes(prefix)
    }
}

/// Build the hasher selected by configuration.
pub fn hasher_for(algorithm: HashAlgorithm) -> Arc<dyn RingHasher> {
    match algorithm {
        HashAlgorithm::Murmur3 => Arc::new(Murmur3Hasher),
        HashAlgorithm::Crc32 => Arc::new(Crc32Hasher),
        HashAlgorithm::Blake3 => Arc::new(Blake3Hasher),
    }
}
