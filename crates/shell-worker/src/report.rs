//! Per-event reports for observability.

use serde::Serialize;
use shell_core::{CacheName, LifecycleEventKind};

/// Result of a successful install.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallReport {
    /// Bucket that was populated.
    pub cache: CacheName,
    /// Number of manifest assets stored.
    pub assets_cached: usize,
}

/// Result of a successful activation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivateReport {
    /// Bucket that remains.
    pub cache: CacheName,
    /// Superseded buckets that were deleted.
    pub deleted: Vec<CacheName>,
}

/// How an intercepted request was answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchDisposition {
    Passthrough,
    Network,
    Cache,
    Failed,
}

/// Result of handling one fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchReport {
    pub method: String,
    pub url: String,
    pub disposition: FetchDisposition,
}

/// A report for any lifecycle event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum LifecycleReport {
    Install(InstallReport),
    Activate(ActivateReport),
    Fetch(FetchReport),
}

impl LifecycleReport {
    /// The lifecycle signal this report describes.
    pub fn kind(&self) -> LifecycleEventKind {
        match self {
            Self::Install(_) => LifecycleEventKind::Install,
            Self::Activate(_) => LifecycleEventKind::Activate,
            Self::Fetch(_) => LifecycleEventKind::Fetch,
        }
    }

    /// Format as JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| format!("{{\"event\":\"{}\"}}", self.kind()))
    }
}

/// Observer for completed lifecycle events.
pub trait LifecycleObserver: Send + Sync {
    /// Called after an event was handled.
    fn on_report(&self, report: &LifecycleReport);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_install_report_json() {
        let report = LifecycleReport::Install(InstallReport {
            cache: CacheName::new("v1").unwrap(),
            assets_cached: 3,
        });

        assert_eq!(report.kind(), LifecycleEventKind::Install);
        assert_eq!(
            report.to_json(),
            r#"{"event":"install","cache":"v1","assets_cached":3}"#
        );
    }

    #[test]
    fn test_fetch_report_json() {
        let report = LifecycleReport::Fetch(FetchReport {
            method: "GET".into(),
            url: "https://app.example/".into(),
            disposition: FetchDisposition::Cache,
        });

        let value: serde_json::Value = serde_json::from_str(&report.to_json()).unwrap();
        assert_eq!(value["event"], "fetch");
        assert_eq!(value["disposition"], "cache");
    }
}
