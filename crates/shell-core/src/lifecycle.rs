//! Lifecycle signals delivered by the hosting runtime.

use serde::{Deserialize, Serialize};

/// The three lifecycle signals the shell responds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleEventKind {
    /// A new deployment is being installed; populate the bucket.
    Install,
    /// The deployment takes over; drop superseded buckets.
    Activate,
    /// A controlled page issued a request.
    Fetch,
}

impl LifecycleEventKind {
    /// Get the event name as the host spells it.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Install => "install",
            Self::Activate => "activate",
            Self::Fetch => "fetch",
        }
    }
}

impl std::fmt::Display for LifecycleEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
