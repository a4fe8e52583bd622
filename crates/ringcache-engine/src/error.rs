//! Error types for the cache orchestrator.

/// Errors that can occur during cache operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The hash ring could not be built from the given configuration.
    #[error("ring configuration error: {0}")]
    Ring(#[from] ringcache_placement::RingError),

    /// A node connection failed.
    #[error("cache io error: {0}")]
    Connection(#[from] ringcache_store::ConnectionError),
}
