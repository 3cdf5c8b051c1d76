//! Lifecycle error types.

use shell_cache::CacheError;
use shell_core::CacheName;
use shell_net::NetworkError;

/// An asset that could not be fetched during install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetFailure {
    /// Absolute asset URL.
    pub url: String,
    /// Why the fetch failed.
    pub error: NetworkError,
}

impl std::fmt::Display for AssetFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.url, self.error)
    }
}

/// Error type for lifecycle handlers.
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    /// One or more manifest assets could not be fetched. Nothing was cached.
    #[error("install of '{cache}' failed: {} asset(s) could not be fetched", .failures.len())]
    Install {
        cache: CacheName,
        failures: Vec<AssetFailure>,
    },

    #[error("cache storage error: {0}")]
    Storage(#[from] CacheError),

    #[error("host error: {0}")]
    Host(#[from] anyhow::Error),

    #[error("fetch event already has a response")]
    AlreadyResponded,
}
