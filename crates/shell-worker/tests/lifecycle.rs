//! End-to-end lifecycle tests: install, activate, and fetch against
//! in-memory storage, a scripted network, and a recording host.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::future::join_all;
use http::{Method, StatusCode};
use shell_cache::{CacheError, CacheResult, CacheStorage, InMemoryCacheStorage};
use shell_core::{AssetManifest, CacheName, Request, RequestKey, Response, ShellConfig};
use shell_net::{NetworkError, ScriptedNetwork};
use shell_worker::{
    CacheLifecycleManager, EventDispatcher, FetchDisposition, FetchOutcome, Host,
    LifecycleError, LifecycleObserver, LifecycleReport, RecordingHost, ResponseSource,
};
use url::Url;

const SCOPE: &str = "https://app.example/";

fn url(path: &str) -> Url {
    Url::parse(SCOPE).unwrap().join(path).unwrap()
}

fn config(cache: &str, assets: &[&str]) -> ShellConfig {
    ShellConfig::new(
        Url::parse(SCOPE).unwrap(),
        CacheName::new(cache).unwrap(),
        AssetManifest::new(assets.iter().copied()).unwrap(),
    )
    .unwrap()
}

/// A network that serves every asset in `assets` with its path as the body.
fn serving(assets: &[&str]) -> ScriptedNetwork {
    assets.iter().fold(ScriptedNetwork::new(), |network, path| {
        network.with_response(&url(path), Response::ok(format!("body of {path}")))
    })
}

struct Fixture {
    storage: Arc<InMemoryCacheStorage>,
    network: Arc<ScriptedNetwork>,
    host: Arc<RecordingHost>,
    manager: CacheLifecycleManager,
}

fn fixture(cache: &str, assets: &[&str], network: ScriptedNetwork) -> Fixture {
    let storage = Arc::new(InMemoryCacheStorage::new());
    let network = Arc::new(network);
    let host = Arc::new(RecordingHost::new());
    let manager = CacheLifecycleManager::new(
        config(cache, assets),
        storage.clone(),
        network.clone(),
        host.clone(),
    );
    Fixture {
        storage,
        network,
        host,
        manager,
    }
}

const ASSETS: &[&str] = &["./", "./index.html", "./app.js", "./app.css"];

#[derive(Default)]
struct CollectingObserver {
    reports: Mutex<Vec<LifecycleReport>>,
}

impl LifecycleObserver for CollectingObserver {
    fn on_report(&self, report: &LifecycleReport) {
        self.reports.lock().unwrap().push(report.clone());
    }
}

#[tokio::test]
async fn test_install_caches_every_manifest_asset() {
    let f = fixture("v1", ASSETS, serving(ASSETS));

    let report = f.manager.install().await.unwrap();

    assert_eq!(report.assets_cached, ASSETS.len());
    let name = CacheName::new("v1").unwrap();
    for path in ASSETS {
        let cached = f
            .storage
            .match_request(&name, &RequestKey::from_url(&url(path)))
            .await
            .unwrap();
        assert_eq!(cached, Some(Response::ok(format!("body of {path}"))));
    }
    assert_eq!(f.host.skip_waiting_calls(), 1);
}

#[tokio::test]
async fn test_install_is_all_or_nothing() {
    let network = serving(&ASSETS[..3]).with_failure(&url("./app.css"), NetworkError::Offline);
    let f = fixture("v1", ASSETS, network);

    let err = f.manager.install().await.unwrap_err();

    match err {
        LifecycleError::Install { cache, failures } => {
            assert_eq!(cache.as_str(), "v1");
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].url, "https://app.example/app.css");
            assert_eq!(failures[0].error, NetworkError::Offline);
        }
        other => panic!("expected install failure, got {other:?}"),
    }
    assert_eq!(f.storage.len(&CacheName::new("v1").unwrap()).await, Some(0));
    assert_eq!(f.host.skip_waiting_calls(), 0);
}

#[tokio::test]
async fn test_install_rejects_error_status() {
    // `./app.css` is unscripted and answers 404.
    let f = fixture("v1", ASSETS, serving(&ASSETS[..3]));

    let err = f.manager.install().await.unwrap_err();

    let LifecycleError::Install { failures, .. } = err else {
        panic!("expected install failure");
    };
    assert_eq!(
        failures[0].error,
        NetworkError::BadStatus {
            status: 404,
            url: "https://app.example/app.css".into(),
        }
    );
    assert_eq!(f.storage.len(&CacheName::new("v1").unwrap()).await, Some(0));
}

#[tokio::test]
async fn test_install_reports_every_failed_asset() {
    let f = fixture("v1", ASSETS, ScriptedNetwork::new());
    f.network.set_offline(true);

    let err = f.manager.install().await.unwrap_err();
    assert_eq!(
        err.to_string(),
        format!("install of 'v1' failed: {} asset(s) could not be fetched", ASSETS.len())
    );

    let LifecycleError::Install { failures, .. } = err else {
        panic!("expected install failure");
    };
    assert_eq!(failures.len(), ASSETS.len());
    assert!(failures.iter().all(|failure| failure.error == NetworkError::Offline));
    assert_eq!(f.network.request_count().await, ASSETS.len());
}

#[tokio::test]
async fn test_install_storage_failure_fails_install() {
    /// Storage that refuses every write.
    struct ReadOnlyStorage(InMemoryCacheStorage);

    #[async_trait]
    impl CacheStorage for ReadOnlyStorage {
        async fn open(&self, name: &CacheName) -> CacheResult<()> {
            self.0.open(name).await
        }

        async fn put(&self, _: &CacheName, _: RequestKey, _: Response) -> CacheResult<()> {
            Err(CacheError::Storage("quota exceeded".into()))
        }

        async fn put_all(
            &self,
            _: &CacheName,
            _: Vec<(RequestKey, Response)>,
        ) -> CacheResult<()> {
            Err(CacheError::Storage("quota exceeded".into()))
        }

        async fn match_request(
            &self,
            name: &CacheName,
            key: &RequestKey,
        ) -> CacheResult<Option<Response>> {
            self.0.match_request(name, key).await
        }

        async fn delete(&self, name: &CacheName) -> CacheResult<bool> {
            self.0.delete(name).await
        }

        async fn list_names(&self) -> CacheResult<Vec<CacheName>> {
            self.0.list_names().await
        }
    }

    let host = Arc::new(RecordingHost::new());
    let manager = CacheLifecycleManager::new(
        config("v1", ASSETS),
        Arc::new(ReadOnlyStorage(InMemoryCacheStorage::new())),
        Arc::new(serving(ASSETS)),
        host.clone(),
    );

    let err = manager.install().await.unwrap_err();
    assert!(matches!(err, LifecycleError::Storage(_)));
    assert_eq!(host.skip_waiting_calls(), 0);
}

#[tokio::test]
async fn test_install_survives_skip_waiting_failure() {
    struct StuckWaiting;

    #[async_trait]
    impl Host for StuckWaiting {
        async fn skip_waiting(&self) -> anyhow::Result<()> {
            anyhow::bail!("skip waiting rejected")
        }

        async fn claim_clients(&self) -> anyhow::Result<()> {
            Ok(())
        }
    }

    let storage = Arc::new(InMemoryCacheStorage::new());
    let manager = CacheLifecycleManager::new(
        config("v1", ASSETS),
        storage.clone(),
        Arc::new(serving(ASSETS)),
        Arc::new(StuckWaiting),
    );

    let report = manager.install().await.unwrap();

    assert_eq!(report.assets_cached, ASSETS.len());
    assert_eq!(storage.len(&report.cache).await, Some(ASSETS.len()));
}

#[tokio::test]
async fn test_activate_leaves_only_current_bucket() {
    let f = fixture("v2", ASSETS, serving(ASSETS));
    for old in ["v0", "v1", "other-app"] {
        f.storage.open(&CacheName::new(old).unwrap()).await.unwrap();
    }
    f.manager.install().await.unwrap();

    let report = f.manager.activate().await.unwrap();

    assert_eq!(report.cache.as_str(), "v2");
    assert_eq!(report.deleted.len(), 3);
    assert_eq!(
        f.storage.list_names().await.unwrap(),
        vec![CacheName::new("v2").unwrap()]
    );
    assert_eq!(f.storage.len(&CacheName::new("v2").unwrap()).await, Some(ASSETS.len()));
    assert_eq!(f.host.claim_calls(), 1);
}

#[tokio::test]
async fn test_activate_with_nothing_to_delete() {
    let f = fixture("v1", ASSETS, serving(ASSETS));
    f.manager.install().await.unwrap();

    let report = f.manager.activate().await.unwrap();

    assert!(report.deleted.is_empty());
    assert_eq!(f.storage.list_names().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_activate_host_failure() {
    struct NoClients;

    #[async_trait]
    impl Host for NoClients {
        async fn skip_waiting(&self) -> anyhow::Result<()> {
            Ok(())
        }

        async fn claim_clients(&self) -> anyhow::Result<()> {
            anyhow::bail!("clients API unavailable")
        }
    }

    let storage = Arc::new(InMemoryCacheStorage::new());
    storage.open(&CacheName::new("v0").unwrap()).await.unwrap();
    let manager = CacheLifecycleManager::new(
        config("v1", ASSETS),
        storage.clone(),
        Arc::new(serving(ASSETS)),
        Arc::new(NoClients),
    );

    let err = manager.activate().await.unwrap_err();

    assert!(matches!(err, LifecycleError::Host(_)));
    // Cleanup happens before claiming.
    assert!(storage.list_names().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_non_get_requests_pass_through() {
    let f = fixture("v1", ASSETS, serving(ASSETS));
    f.manager.install().await.unwrap();
    let before = f.network.request_count().await;

    for method in [Method::POST, Method::PUT, Method::PATCH, Method::DELETE, Method::HEAD] {
        let outcome = f.manager.fetch(&Request::new(method, url("./index.html"))).await;
        assert!(outcome.is_passthrough());
    }

    // The manager never touched the network for them.
    assert_eq!(f.network.request_count().await, before);
}

#[tokio::test]
async fn test_non_http_requests_pass_through() {
    let f = fixture("v1", ASSETS, serving(ASSETS));

    let request = Request::get(Url::parse("chrome-extension://abc/inject.js").unwrap());
    assert!(f.manager.fetch(&request).await.is_passthrough());
    assert_eq!(f.network.request_count().await, 0);
}

#[tokio::test]
async fn test_online_get_returns_network_response() {
    let f = fixture("v1", ASSETS, serving(ASSETS));
    f.manager.install().await.unwrap();

    // Overwrite the cached copy so a cache hit would be visible.
    f.manager
        .bucket()
        .put(&Request::get(url("./app.js")), Response::ok("stale"))
        .await
        .unwrap();

    let outcome = f.manager.fetch(&Request::get(url("./app.js"))).await;

    assert_eq!(outcome.response(), Some(&Response::ok("body of ./app.js")));
    assert_eq!(outcome.source(), Some(ResponseSource::Network));
}

#[tokio::test]
async fn test_online_http_error_is_returned_as_is() {
    let f = fixture("v1", ASSETS, serving(ASSETS));
    f.manager.install().await.unwrap();

    let outcome = f.manager.fetch(&Request::get(url("./missing.js"))).await;

    assert_eq!(outcome.response().map(Response::status), Some(StatusCode::NOT_FOUND));
}

#[tokio::test]
async fn test_offline_get_returns_cached_entry() {
    let f = fixture("v1", ASSETS, serving(ASSETS));
    f.manager.install().await.unwrap();
    f.network.set_offline(true);

    let outcome = f.manager.fetch(&Request::get(url("./index.html#/genesis/1"))).await;

    assert_eq!(outcome.response(), Some(&Response::ok("body of ./index.html")));
    assert_eq!(outcome.source(), Some(ResponseSource::Cache));
}

#[tokio::test]
async fn test_offline_miss_propagates_failure() {
    let network = serving(ASSETS).with_failure(
        &url("./data/genesis.json"),
        NetworkError::Timeout("https://app.example/data/genesis.json".into()),
    );
    let f = fixture("v1", ASSETS, network);
    f.manager.install().await.unwrap();

    let outcome = f.manager.fetch(&Request::get(url("./data/genesis.json"))).await;

    assert_eq!(
        outcome,
        FetchOutcome::Failed(NetworkError::Timeout(
            "https://app.example/data/genesis.json".into()
        ))
    );
}

#[tokio::test]
async fn test_fetch_before_install_misses() {
    let f = fixture("v1", ASSETS, serving(ASSETS));
    f.network.set_offline(true);

    let outcome = f.manager.fetch(&Request::get(url("./index.html"))).await;

    assert_eq!(outcome, FetchOutcome::Failed(NetworkError::Offline));
    // Lookups never create the bucket.
    assert!(f.storage.list_names().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_concurrent_fetches_are_independent() {
    let f = fixture("v1", ASSETS, serving(ASSETS));
    f.manager.install().await.unwrap();
    f.network.set_offline(true);

    let requests = vec![
        Request::get(url("./index.html")),
        Request::get(url("./not-cached.png")),
        Request::new(Method::POST, url("./api/notes")),
        Request::get(url("./app.js")),
        Request::get(url("./data/genesis.json")),
    ];

    let concurrent = join_all(requests.iter().map(|request| f.manager.fetch(request))).await;

    let mut sequential = Vec::with_capacity(requests.len());
    for request in &requests {
        sequential.push(f.manager.fetch(request).await);
    }
    assert_eq!(concurrent, sequential);
    assert_eq!(concurrent[0].response(), Some(&Response::ok("body of ./index.html")));
    assert_eq!(concurrent[1], FetchOutcome::Failed(NetworkError::Offline));
    assert!(concurrent[2].is_passthrough());
    assert_eq!(concurrent[3].source(), Some(ResponseSource::Cache));

    let mut dispatcher = EventDispatcher::new();
    f.manager.register(&mut dispatcher);
    let dispatched = join_all(
        requests
            .iter()
            .cloned()
            .map(|request| dispatcher.dispatch_fetch(request)),
    )
    .await
    .into_iter()
    .collect::<Result<Vec<_>, _>>()
    .unwrap();
    assert_eq!(dispatched, sequential);
}

#[tokio::test]
async fn test_full_lifecycle_through_dispatcher() {
    let f = fixture("v2", ASSETS, serving(ASSETS));
    f.storage.open(&CacheName::new("v1").unwrap()).await.unwrap();

    let mut dispatcher = EventDispatcher::new();
    f.manager.register(&mut dispatcher);

    dispatcher.dispatch_install().await.unwrap();
    dispatcher.dispatch_activate().await.unwrap();
    assert_eq!(
        f.storage.list_names().await.unwrap(),
        vec![CacheName::new("v2").unwrap()]
    );

    let post = Request::new(Method::POST, url("./api/notes"));
    assert!(dispatcher.dispatch_fetch(post).await.unwrap().is_passthrough());

    f.network.set_offline(true);
    let outcome = dispatcher
        .dispatch_fetch(Request::get(url("./app.css")))
        .await
        .unwrap();
    assert_eq!(outcome.source(), Some(ResponseSource::Cache));

    let outcome = dispatcher
        .dispatch_fetch(Request::get(url("./not-cached.png")))
        .await
        .unwrap();
    assert_eq!(outcome, FetchOutcome::Failed(NetworkError::Offline));
}

#[tokio::test]
async fn test_failed_install_fails_dispatch() {
    let f = fixture("v1", ASSETS, ScriptedNetwork::new());
    f.network.set_offline(true);

    let mut dispatcher = EventDispatcher::new();
    f.manager.register(&mut dispatcher);

    let err = dispatcher.dispatch_install().await.unwrap_err();
    assert!(matches!(err, LifecycleError::Install { .. }));
}

#[tokio::test]
async fn test_observer_sees_each_event() {
    let observer = Arc::new(CollectingObserver::default());
    let f = fixture("v1", ASSETS, serving(ASSETS));
    let manager = f.manager.clone().with_observer(observer.clone());

    manager.install().await.unwrap();
    manager.activate().await.unwrap();
    manager.fetch(&Request::get(url("./app.js"))).await;
    manager
        .fetch(&Request::new(Method::POST, url("./api")))
        .await;
    f.network.set_offline(true);
    manager.fetch(&Request::get(url("./app.js"))).await;
    manager.fetch(&Request::get(url("./nope.js"))).await;

    let reports = observer.reports.lock().unwrap();
    let dispositions: Vec<FetchDisposition> = reports
        .iter()
        .filter_map(|r| match r {
            LifecycleReport::Fetch(fetch) => Some(fetch.disposition),
            _ => None,
        })
        .collect();

    assert!(matches!(reports[0], LifecycleReport::Install(_)));
    assert!(matches!(reports[1], LifecycleReport::Activate(_)));
    assert_eq!(
        dispositions,
        vec![
            FetchDisposition::Network,
            FetchDisposition::Passthrough,
            FetchDisposition::Cache,
            FetchDisposition::Failed,
        ]
    );
}

#[tokio::test]
async fn test_builtin_config_installs() {
    let assets: Vec<&str> = shell_core::ASSET_MANIFEST.to_vec();
    let storage = Arc::new(InMemoryCacheStorage::new());
    let manager = CacheLifecycleManager::new(
        ShellConfig::builtin(Url::parse(SCOPE).unwrap()).unwrap(),
        storage.clone(),
        Arc::new(serving(&assets)),
        Arc::new(RecordingHost::new()),
    );

    let report = manager.install().await.unwrap();

    assert_eq!(report.cache.as_str(), shell_core::CACHE_NAME);
    assert_eq!(storage.len(&report.cache).await, Some(assets.len()));
}
