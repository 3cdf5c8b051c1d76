//! Handle on a single named bucket.

use std::sync::Arc;

use shell_core::{CacheName, Request, Response};

use crate::error::{CacheError, CacheResult};
use crate::storage::CacheStorage;

/// A named cache bucket backed by shared storage.
///
/// Cloning a bucket clones the handle, not the entries.
#[derive(Clone)]
pub struct CacheBucket {
    storage: Arc<dyn CacheStorage>,
    name: CacheName,
}

impl CacheBucket {
    /// Bind to a bucket without creating it.
    ///
    /// Lookups on a bucket that does not exist are misses.
    pub fn new(storage: Arc<dyn CacheStorage>, name: CacheName) -> Self {
        Self { storage, name }
    }

    /// Open the bucket, creating it if absent.
    pub async fn open(storage: Arc<dyn CacheStorage>, name: CacheName) -> CacheResult<Self> {
        storage.open(&name).await?;
        tracing::debug!(cache = %name, "cache bucket opened");
        Ok(Self { storage, name })
    }

    /// The bucket name.
    pub fn name(&self) -> &CacheName {
        &self.name
    }

    /// Store a response for a GET request.
    pub async fn put(&self, request: &Request, response: Response) -> CacheResult<()> {
        ensure_cacheable(request)?;
        self.storage.put(&self.name, request.key(), response).await
    }

    /// Store responses for a batch of GET requests.
    ///
    /// Every request is checked before anything is written.
    pub async fn put_all(&self, entries: Vec<(Request, Response)>) -> CacheResult<()> {
        let entries = entries
            .into_iter()
            .map(|(request, response)| {
                ensure_cacheable(&request)?;
                Ok((request.key(), response))
            })
            .collect::<CacheResult<Vec<_>>>()?;
        self.storage.put_all(&self.name, entries).await
    }

    /// Find the stored response for a request.
    ///
    /// Only GET requests are ever stored, so anything else is a miss.
    pub async fn match_request(&self, request: &Request) -> CacheResult<Option<Response>> {
        if !request.is_read_only() {
            return Ok(None);
        }
        self.storage.match_request(&self.name, &request.key()).await
    }
}

impl std::fmt::Debug for CacheBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheBucket").field("name", &self.name).finish()
    }
}

fn ensure_cacheable(request: &Request) -> CacheResult<()> {
    if request.is_read_only() {
        Ok(())
    } else {
        Err(CacheError::UnsupportedMethod {
            method: request.method().to_string(),
            url: request.url().to_string(),
        })
    }
}
