//! Result cache error types

use thiserror::Error;

/// Errors originated by a [`ResultCache`](super::ResultCache)
///
/// A miss is an expected outcome: callers fall back to recomputation or to the
/// storage adapter. It is never worth logging above `debug`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    /// Key is not held by the cache (never inserted or already evicted)
    #[error("Cache miss")]
    Miss,
}

impl CacheError {
    /// Check whether this error is a plain cache miss
    pub fn is_miss(&self) -> bool {
        matches!(self, Self::Miss)
    }
}

/// Result type for cache lookups
pub type CacheResult<T> = Result<T, CacheError>;
