//! Network error types.

/// Error type for network fetches.
///
/// Every variant except `BadStatus` is a transport failure: the request
/// never produced a response.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NetworkError {
    #[error("network is offline")]
    Offline,

    #[error("DNS lookup failed for {0}")]
    Dns(String),

    #[error("request to {0} timed out")]
    Timeout(String),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("request was aborted")]
    Aborted,

    #[error("HTTP {status} for {url}")]
    BadStatus { status: u16, url: String },
}

impl NetworkError {
    /// Whether the request failed before any response arrived.
    pub fn is_transport(&self) -> bool {
        !matches!(self, Self::BadStatus { .. })
    }
}
