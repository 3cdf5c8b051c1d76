//! The cache storage interface.

use async_trait::async_trait;
use shell_core::{CacheName, RequestKey, Response};

use crate::error::CacheResult;

/// Named buckets of request-to-response entries, owned by the host.
///
/// Consistency of concurrent reads and writes is the backend's concern.
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Open the named bucket, creating it if absent.
    async fn open(&self, name: &CacheName) -> CacheResult<()>;

    /// Store an entry, replacing any previous entry for the same key.
    async fn put(&self, name: &CacheName, key: RequestKey, response: Response) -> CacheResult<()>;

    /// Store a batch of entries.
    ///
    /// The default writes entries one by one. Backends that can commit a
    /// batch atomically should override it so a failure leaves no entry from
    /// the batch behind.
    async fn put_all(
        &self,
        name: &CacheName,
        entries: Vec<(RequestKey, Response)>,
    ) -> CacheResult<()> {
        for (key, response) in entries {
            self.put(name, key, response).await?;
        }
        Ok(())
    }

    /// Look up an entry. A missing bucket is a miss, not an error.
    async fn match_request(
        &self,
        name: &CacheName,
        key: &RequestKey,
    ) -> CacheResult<Option<Response>>;

    /// Delete a bucket. Returns whether it existed.
    async fn delete(&self, name: &CacheName) -> CacheResult<bool>;

    /// Names of every existing bucket.
    async fn list_names(&self) -> CacheResult<Vec<CacheName>>;
}
