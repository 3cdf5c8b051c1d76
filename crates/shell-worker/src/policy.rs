//! Network-first policy with cache fallback.

use serde::Serialize;
use shell_cache::CacheBucket;
use shell_core::{Request, Response};
use shell_net::{Network, NetworkError};

/// Where a served response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseSource {
    /// Live network fetch.
    Network,
    /// Cache bucket entry, after the network failed.
    Cache,
}

/// A response answered by the shell.
#[derive(Debug, Clone, PartialEq)]
pub struct Served {
    /// The response handed back to the page.
    pub response: Response,
    /// Where it came from.
    pub source: ResponseSource,
}

impl Served {
    /// Take the response.
    pub fn into_response(self) -> Response {
        self.response
    }
}

/// What happened to an intercepted request.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// The shell did not intervene; default network handling applies.
    Passthrough,
    /// The shell answered the request.
    Served(Served),
    /// Network and cache both failed; the network error is surfaced unchanged.
    Failed(NetworkError),
}

impl FetchOutcome {
    /// Check if the shell stayed out of the way.
    pub fn is_passthrough(&self) -> bool {
        matches!(self, Self::Passthrough)
    }

    /// The served response, if any.
    pub fn response(&self) -> Option<&Response> {
        match self {
            Self::Served(served) => Some(&served.response),
            _ => None,
        }
    }

    /// Where the served response came from, if any.
    pub fn source(&self) -> Option<ResponseSource> {
        match self {
            Self::Served(served) => Some(served.source),
            _ => None,
        }
    }
}

/// Whether the shell handles a request at all.
///
/// Only read-only fetches over `http`/`https` are intercepted.
pub fn intercepts(request: &Request) -> bool {
    request.is_read_only() && request.is_http()
}

/// Try the network; on failure, answer from the bucket.
///
/// The cache is consulted only on a transport failure, when the network
/// produced no response. HTTP error statuses are returned as-is, whether the
/// network hands them back as a response or as [`NetworkError::BadStatus`].
/// When the cache misses, or the lookup itself fails, the original network
/// error is returned.
pub async fn network_first(
    network: &dyn Network,
    bucket: &CacheBucket,
    request: &Request,
) -> Result<Served, NetworkError> {
    let error = match network.fetch(request).await {
        Ok(response) => {
            return Ok(Served {
                response,
                source: ResponseSource::Network,
            })
        }
        Err(error) if error.is_transport() => error,
        Err(error) => return Err(error),
    };

    tracing::debug!(url = %request.url(), %error, "network fetch failed, trying cache");

    match bucket.match_request(request).await {
        Ok(Some(response)) => Ok(Served {
            response,
            source: ResponseSource::Cache,
        }),
        Ok(None) => Err(error),
        Err(cache_error) => {
            tracing::warn!(
                url = %request.url(),
                cache = %bucket.name(),
                error = %cache_error,
                "cache lookup failed"
            );
            Err(error)
        }
    }
}
