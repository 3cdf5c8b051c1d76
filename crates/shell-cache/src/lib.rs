//! Cache storage for the offline shell.
//!
//! The host platform owns the real cache storage. This crate models it as an
//! injectable dependency so lifecycle logic can run against any backend:
//! - `CacheStorage` - The storage interface (`open`, `put`, `match`, `delete`, `list_names`)
//! - `CacheBucket` - A handle on one named bucket
//! - `InMemoryCacheStorage` - A process-local backend
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use shell_cache::{CacheBucket, InMemoryCacheStorage};
//!
//! let storage = Arc::new(InMemoryCacheStorage::new());
//! let bucket = CacheBucket::open(storage, config.cache_name().clone()).await?;
//!
//! bucket.put(&request, response).await?;
//! let cached = bucket.match_request(&request).await?;
//! ```

mod bucket;
mod error;
mod memory;
mod storage;

pub use bucket::CacheBucket;
pub use error::{CacheError, CacheResult};
pub use memory::InMemoryCacheStorage;
pub use storage::CacheStorage;
