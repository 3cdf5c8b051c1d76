//! Cache error types.

use shell_core::CacheName;
use thiserror::Error;

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Errors that can occur when using cache storage.
#[derive(Error, Debug)]
pub enum CacheError {
    /// The bucket was never opened, or has been deleted.
    #[error("cache bucket '{0}' does not exist")]
    BucketNotFound(CacheName),

    /// Only GET requests can be stored.
    #[error("cannot cache a {method} request for {url}")]
    UnsupportedMethod { method: String, url: String },

    /// Backend storage failure.
    #[error("storage error: {0}")]
    Storage(String),
}
