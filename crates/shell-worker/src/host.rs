//! Signals the shell sends back to its host.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

/// The hosting runtime, as seen from the lifecycle manager.
#[async_trait]
pub trait Host: Send + Sync {
    /// Activate the installed deployment without waiting for old pages to close.
    async fn skip_waiting(&self) -> anyhow::Result<()>;

    /// Take control of in-scope pages without waiting for a reload.
    async fn claim_clients(&self) -> anyhow::Result<()>;
}

/// Host that only counts the signals it receives.
///
/// Useful for headless runs and tests.
#[derive(Debug, Default)]
pub struct RecordingHost {
    skip_waiting: AtomicUsize,
    claims: AtomicUsize,
}

impl RecordingHost {
    /// Create a host with zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times `skip_waiting` was called.
    pub fn skip_waiting_calls(&self) -> usize {
        self.skip_waiting.load(Ordering::SeqCst)
    }

    /// How many times `claim_clients` was called.
    pub fn claim_calls(&self) -> usize {
        self.claims.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Host for RecordingHost {
    async fn skip_waiting(&self) -> anyhow::Result<()> {
        self.skip_waiting.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn claim_clients(&self) -> anyhow::Result<()> {
        self.claims.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
