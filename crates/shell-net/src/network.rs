//! The live network fetch.

use async_trait::async_trait;
use shell_core::{Request, Response};

use crate::error::NetworkError;

/// A live network fetch, performed by the host's network stack.
///
/// HTTP error statuses are responses, not failures. Implementations return
/// `Err` only when no response was produced.
#[async_trait]
pub trait Network: Send + Sync {
    /// Fetch a request from the network.
    async fn fetch(&self, request: &Request) -> Result<Response, NetworkError>;
}

/// Reject responses that are not 2xx.
///
/// Used when populating a bucket: an asset that answered with an error page
/// must not be cached as if it were the asset.
pub fn ensure_success(request: &Request, response: Response) -> Result<Response, NetworkError> {
    if response.is_success() {
        Ok(response)
    } else {
        Err(NetworkError::BadStatus {
            status: response.status().as_u16(),
            url: request.url().to_string(),
        })
    }
}
