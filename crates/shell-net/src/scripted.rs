//! Scripted network for development and testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use http::StatusCode;
use shell_core::{Request, RequestKey, Response};
use tokio::sync::Mutex;
use url::Url;

use crate::error::NetworkError;
use crate::network::Network;

/// A network that answers from a fixed script.
///
/// Unscripted URLs answer `404 Not Found`, like a server that does not know
/// the path. Going offline makes every fetch fail with
/// [`NetworkError::Offline`]. Every fetched request is recorded.
#[derive(Debug, Default)]
pub struct ScriptedNetwork {
    routes: HashMap<RequestKey, Result<Response, NetworkError>>,
    offline: AtomicBool,
    log: Mutex<Vec<Request>>,
}

impl ScriptedNetwork {
    /// Create a network with no routes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `url` with `response`.
    pub fn with_response(mut self, url: &Url, response: Response) -> Self {
        self.routes.insert(RequestKey::from_url(url), Ok(response));
        self
    }

    /// Fail fetches of `url` with `error`.
    pub fn with_failure(mut self, url: &Url, error: NetworkError) -> Self {
        self.routes.insert(RequestKey::from_url(url), Err(error));
        self
    }

    /// Take the network down or bring it back.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Whether the network is currently offline.
    pub fn is_offline(&self) -> bool {
        self.offline.load(Ordering::SeqCst)
    }

    /// Requests fetched so far, in order.
    pub async fn requests(&self) -> Vec<Request> {
        self.log.lock().await.clone()
    }

    /// Number of requests fetched so far.
    pub async fn request_count(&self) -> usize {
        self.log.lock().await.len()
    }
}

#[async_trait]
impl Network for ScriptedNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response, NetworkError> {
        self.log.lock().await.push(request.clone());

        if self.is_offline() {
            return Err(NetworkError::Offline);
        }

        match self.routes.get(&request.key()) {
            Some(scripted) => scripted.clone(),
            None => Ok(Response::new(StatusCode::NOT_FOUND, "")),
        }
    }
}
