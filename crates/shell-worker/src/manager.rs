//! The cache lifecycle manager.

use std::sync::Arc;

use futures::future::{join_all, try_join_all};
use shell_cache::{CacheBucket, CacheStorage};
use shell_core::{CacheName, Request, ShellConfig};
use shell_net::{ensure_success, Network, NetworkError};

use crate::dispatch::EventDispatcher;
use crate::error::{AssetFailure, LifecycleError};
use crate::host::Host;
use crate::policy::{intercepts, network_first, FetchOutcome, ResponseSource, Served};
use crate::report::{
    ActivateReport, FetchDisposition, FetchReport, InstallReport, LifecycleObserver,
    LifecycleReport,
};

/// Owns one cache bucket and answers the host's lifecycle signals.
///
/// - **install** fetches every manifest asset and stores them all, or none.
/// - **activate** deletes every bucket but the current one and claims pages.
/// - **fetch** tries the network first and falls back to the bucket.
///
/// Cloning is cheap; clones share storage, network, and host.
#[derive(Clone)]
pub struct CacheLifecycleManager {
    config: Arc<ShellConfig>,
    storage: Arc<dyn CacheStorage>,
    network: Arc<dyn Network>,
    host: Arc<dyn Host>,
    observer: Option<Arc<dyn LifecycleObserver>>,
}

impl CacheLifecycleManager {
    /// Create a manager for one deployment.
    pub fn new(
        config: ShellConfig,
        storage: Arc<dyn CacheStorage>,
        network: Arc<dyn Network>,
        host: Arc<dyn Host>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            storage,
            network,
            host,
            observer: None,
        }
    }

    /// Report every handled event to `observer`.
    pub fn with_observer(mut self, observer: Arc<dyn LifecycleObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// The deployment configuration.
    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    /// Handle on the current bucket. Does not create it.
    pub fn bucket(&self) -> CacheBucket {
        CacheBucket::new(self.storage.clone(), self.config.cache_name().clone())
    }

    /// Register install, activate, and fetch handlers with `dispatcher`.
    pub fn register(&self, dispatcher: &mut EventDispatcher) {
        let manager = self.clone();
        dispatcher.on_install(move |event| {
            let manager = manager.clone();
            event.wait_until(async move { manager.install().await.map(|_| ()) });
            Ok(())
        });

        let manager = self.clone();
        dispatcher.on_activate(move |event| {
            let manager = manager.clone();
            event.wait_until(async move { manager.activate().await.map(|_| ()) });
            Ok(())
        });

        let manager = self.clone();
        dispatcher.on_fetch(move |event| {
            if !intercepts(event.request()) {
                manager.record_fetch(event.request(), FetchDisposition::Passthrough);
                return Ok(());
            }
            let manager = manager.clone();
            let request = event.request().clone();
            event.respond_with(async move { manager.respond(&request).await })
        });
    }

    /// Populate the bucket with every manifest asset.
    ///
    /// All assets are fetched before anything is written. If any fetch fails
    /// or answers with a non-2xx status, the install fails and the bucket
    /// gains no entries. On success the host is told to skip waiting; a host
    /// that refuses is logged and does not fail the install.
    pub async fn install(&self) -> Result<InstallReport, LifecycleError> {
        let cache = self.config.cache_name().clone();
        let bucket = CacheBucket::open(self.storage.clone(), cache.clone()).await?;

        let fetches = self.config.asset_requests().into_iter().map(|request| async move {
            let result = self
                .network
                .fetch(&request)
                .await
                .and_then(|response| ensure_success(&request, response));
            (request, result)
        });

        let mut entries = Vec::with_capacity(self.config.manifest().len());
        let mut failures = Vec::new();
        for (request, result) in join_all(fetches).await {
            match result {
                Ok(response) => entries.push((request, response)),
                Err(error) => failures.push(AssetFailure {
                    url: request.url().to_string(),
                    error,
                }),
            }
        }

        if !failures.is_empty() {
            tracing::warn!(
                cache = %cache,
                failed = failures.len(),
                asset_count = self.config.manifest().len(),
                "install aborted, nothing cached"
            );
            return Err(LifecycleError::Install { cache, failures });
        }

        let assets_cached = entries.len();
        bucket.put_all(entries).await?;
        tracing::info!(cache = %cache, asset_count = assets_cached, "assets cached");

        // The bucket is committed; activation proceeds normally if the host
        // cannot skip waiting.
        if let Err(error) = self.host.skip_waiting().await {
            tracing::warn!(cache = %cache, error = %error, "skip waiting failed");
        }

        let report = InstallReport {
            cache,
            assets_cached,
        };
        self.notify(LifecycleReport::Install(report.clone()));
        Ok(report)
    }

    /// Delete every bucket except the current one, then claim pages.
    pub async fn activate(&self) -> Result<ActivateReport, LifecycleError> {
        let current = self.config.cache_name();
        let stale: Vec<CacheName> = self
            .storage
            .list_names()
            .await?
            .into_iter()
            .filter(|name| name != current)
            .collect();

        try_join_all(stale.iter().map(|name| self.storage.delete(name))).await?;
        for name in &stale {
            tracing::info!(cache = %name, "deleted superseded cache");
        }

        self.host.claim_clients().await?;
        tracing::info!(cache = %current, deleted = stale.len(), "activated");

        let report = ActivateReport {
            cache: current.clone(),
            deleted: stale,
        };
        self.notify(LifecycleReport::Activate(report.clone()));
        Ok(report)
    }

    /// Handle one intercepted request.
    ///
    /// Non-GET and non-http requests pass through untouched.
    pub async fn fetch(&self, request: &Request) -> FetchOutcome {
        if !intercepts(request) {
            self.record_fetch(request, FetchDisposition::Passthrough);
            return FetchOutcome::Passthrough;
        }

        match self.respond(request).await {
            Ok(served) => FetchOutcome::Served(served),
            Err(error) => FetchOutcome::Failed(error),
        }
    }

    /// Answer an intercepted request network-first.
    pub async fn respond(&self, request: &Request) -> Result<Served, NetworkError> {
        let result = network_first(self.network.as_ref(), &self.bucket(), request).await;

        let disposition = match &result {
            Ok(served) if served.source == ResponseSource::Network => FetchDisposition::Network,
            Ok(_) => FetchDisposition::Cache,
            Err(error) => {
                tracing::debug!(url = %request.url(), %error, "offline and not cached");
                FetchDisposition::Failed
            }
        };
        self.record_fetch(request, disposition);

        result
    }

    fn record_fetch(&self, request: &Request, disposition: FetchDisposition) {
        tracing::trace!(
            method = %request.method(),
            url = %request.url(),
            ?disposition,
            "fetch handled"
        );
        self.notify(LifecycleReport::Fetch(FetchReport {
            method: request.method().to_string(),
            url: request.url().to_string(),
            disposition,
        }));
    }

    fn notify(&self, report: LifecycleReport) {
        if let Some(observer) = &self.observer {
            observer.on_report(&report);
        }
    }
}

impl std::fmt::Debug for CacheLifecycleManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheLifecycleManager")
            .field("cache", self.config.cache_name())
            .field("scope", &self.config.scope().as_str())
            .finish_non_exhaustive()
    }
}
