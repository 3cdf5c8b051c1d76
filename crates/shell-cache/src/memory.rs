//! In-memory cache storage.

use std::collections::BTreeMap;

use async_trait::async_trait;
use shell_core::{CacheName, RequestKey, Response};
use tokio::sync::RwLock;

use crate::error::{CacheError, CacheResult};
use crate::storage::CacheStorage;

type Bucket = BTreeMap<RequestKey, Response>;

/// Cache storage held in process memory.
///
/// Buckets are listed in name order. Batched writes are atomic.
#[derive(Debug, Default)]
pub struct InMemoryCacheStorage {
    buckets: RwLock<BTreeMap<CacheName, Bucket>>,
}

impl InMemoryCacheStorage {
    /// Create an empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries in a bucket, or `None` if it does not exist.
    pub async fn len(&self, name: &CacheName) -> Option<usize> {
        self.buckets.read().await.get(name).map(BTreeMap::len)
    }

    /// Keys stored in a bucket, in key order.
    pub async fn keys(&self, name: &CacheName) -> Vec<RequestKey> {
        self.buckets
            .read()
            .await
            .get(name)
            .map(|bucket| bucket.keys().cloned().collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl CacheStorage for InMemoryCacheStorage {
    async fn open(&self, name: &CacheName) -> CacheResult<()> {
        self.buckets.write().await.entry(name.clone()).or_default();
        Ok(())
    }

    async fn put(&self, name: &CacheName, key: RequestKey, response: Response) -> CacheResult<()> {
        let mut buckets = self.buckets.write().await;
        let bucket = buckets
            .get_mut(name)
            .ok_or_else(|| CacheError::BucketNotFound(name.clone()))?;
        bucket.insert(key, response);
        Ok(())
    }

    async fn put_all(
        &self,
        name: &CacheName,
        entries: Vec<(RequestKey, Response)>,
    ) -> CacheResult<()> {
        // One write guard for the whole batch.
        let mut buckets = self.buckets.write().await;
        let bucket = buckets
            .get_mut(name)
            .ok_or_else(|| CacheError::BucketNotFound(name.clone()))?;
        bucket.extend(entries);
        Ok(())
    }

    async fn match_request(
        &self,
        name: &CacheName,
        key: &RequestKey,
    ) -> CacheResult<Option<Response>> {
        Ok(self
            .buckets
            .read()
            .await
            .get(name)
            .and_then(|bucket| bucket.get(key))
            .cloned())
    }

    async fn delete(&self, name: &CacheName) -> CacheResult<bool> {
        Ok(self.buckets.write().await.remove(name).is_some())
    }

    async fn list_names(&self) -> CacheResult<Vec<CacheName>> {
        Ok(self.buckets.read().await.keys().cloned().collect())
    }
}
