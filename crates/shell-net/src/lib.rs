//! Network access for the offline shell.
//!
//! This crate provides:
//! - `Network` - The live fetch the host performs on the shell's behalf
//! - `NetworkError` - Transport failures that trigger the cache fallback
//! - `ensure_success` - Install-time response validation
//! - `ScriptedNetwork` - A scripted network for development and testing

mod error;
mod network;
mod scripted;

pub use error::*;
pub use network::*;
pub use scripted::*;
