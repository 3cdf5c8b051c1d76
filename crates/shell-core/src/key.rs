//! Request identity for cache lookups.

use serde::{Deserialize, Serialize};
use url::Url;

/// The identity of a request inside a cache bucket.
///
/// Two requests match when their URLs are equal once the fragment is
/// removed. Query strings stay significant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestKey(String);

impl RequestKey {
    /// Build a key from an absolute URL.
    pub fn from_url(url: &Url) -> Self {
        let mut url = url.clone();
        // Fragments never reach the network.
        url.set_fragment(None);
        Self(url.into())
    }

    /// Get the key string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RequestKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
