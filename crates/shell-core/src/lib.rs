//! Core abstractions for the offline shell.
//!
//! This crate provides the fundamental types shared by every other crate:
//! - `Request` / `Response` - Opaque request and response pairs
//! - `RequestKey` - Request identity used for cache lookups
//! - `ShellConfig` - Deployment-time cache name and asset manifest
//! - `LifecycleEventKind` - The three lifecycle signals from the host

mod config;
mod key;
mod lifecycle;
mod request;

pub use config::*;
pub use key::*;
pub use lifecycle::*;
pub use request::*;
