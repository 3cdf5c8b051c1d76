//! Cache lifecycle manager for the offline shell.
//!
//! This crate provides:
//! - `CacheLifecycleManager` - Install, activate, and fetch handling
//! - `EventDispatcher` - Handler registration against the host's lifecycle signals
//! - `ExtendableEvent` / `FetchEvent` - "Wait until complete" and "respond with"
//! - `network_first` - Live fetch with cache fallback
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use shell_worker::{CacheLifecycleManager, EventDispatcher};
//!
//! let manager = CacheLifecycleManager::new(config, storage, network, host);
//! let mut dispatcher = EventDispatcher::new();
//! manager.register(&mut dispatcher);
//!
//! dispatcher.dispatch_install().await?;
//! dispatcher.dispatch_activate().await?;
//! let outcome = dispatcher.dispatch_fetch(request).await?;
//! ```

mod dispatch;
mod error;
mod event;
mod host;
mod manager;
mod policy;
mod report;

pub use dispatch::*;
pub use error::*;
pub use event::*;
pub use host::*;
pub use manager::*;
pub use policy::*;
pub use report::*;
