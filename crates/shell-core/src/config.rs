//! Deployment configuration: cache bucket name and asset manifest.
//!
//! Both values are fixed when the shell is deployed. The compiled-in
//! constants are used unless a deployment manifest is embedded at build time
//! and parsed with [`ShellConfig::from_toml_str`].

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::key::RequestKey;
use crate::request::Request;

/// Name of the cache bucket for this deployment.
///
/// Changing it between deployments is the only versioning mechanism: the
/// next activation deletes every bucket with a different name.
pub const CACHE_NAME: &str = "offline-shell-v1";

/// Paths the application needs to start without a network.
pub const ASSET_MANIFEST: &[&str] = &[
    "./",
    "./index.html",
    "./manifest.webmanifest",
    "./app.js",
    "./app.css",
    "./icons/icon-192.png",
    "./icons/icon-512.png",
];

/// Error type for invalid deployment configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cache name must not be empty")]
    EmptyCacheName,

    #[error("asset manifest must list at least one path")]
    EmptyManifest,

    #[error("asset path '{0}' must be relative to the scope")]
    AbsoluteAsset(String),

    #[error("asset path '{0}' is listed more than once")]
    DuplicateAsset(String),

    #[error("asset path '{path}' cannot be resolved: {source}")]
    UnresolvableAsset {
        path: String,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid scope URL '{url}': {source}")]
    InvalidScope {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("scope '{0}' must be an http or https URL")]
    UnsupportedScope(String),

    #[error("invalid deployment manifest: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Name identifying a cache bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CacheName(String);

impl CacheName {
    /// Create a cache name. Blank names are rejected.
    pub fn new(name: impl Into<String>) -> Result<Self, ConfigError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ConfigError::EmptyCacheName);
        }
        Ok(Self(name))
    }

    /// Get the name as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CacheName {
    type Error = ConfigError;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        Self::new(name)
    }
}

impl From<CacheName> for String {
    fn from(name: CacheName) -> Self {
        name.0
    }
}

impl std::fmt::Display for CacheName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ordered list of asset paths, relative to the shell scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetManifest {
    paths: Vec<String>,
}

impl AssetManifest {
    /// Create a manifest from relative paths.
    ///
    /// Paths may be document-relative (`./app.js`) or root-relative
    /// (`/app.js`). Anything carrying a scheme or host is rejected.
    pub fn new<I, S>(paths: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let paths: Vec<String> = paths.into_iter().map(Into::into).collect();
        if paths.is_empty() {
            return Err(ConfigError::EmptyManifest);
        }

        let mut seen = HashSet::new();
        for path in &paths {
            if path.trim().is_empty() || path.starts_with("//") || Url::parse(path).is_ok() {
                return Err(ConfigError::AbsoluteAsset(path.clone()));
            }
            if !seen.insert(path.as_str()) {
                return Err(ConfigError::DuplicateAsset(path.clone()));
            }
        }

        Ok(Self { paths })
    }

    /// The compiled-in manifest.
    pub fn builtin() -> Self {
        Self {
            paths: ASSET_MANIFEST.iter().map(|p| p.to_string()).collect(),
        }
    }

    /// The paths, in manifest order.
    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    /// Number of assets.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Always false for a validated manifest.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Raw deployment manifest as written in TOML.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    scope: String,
    cache_name: String,
    #[serde(default = "default_assets")]
    assets: Vec<String>,
}

fn default_assets() -> Vec<String> {
    ASSET_MANIFEST.iter().map(|p| p.to_string()).collect()
}

/// Configuration for one deployment of the shell.
#[derive(Debug, Clone)]
pub struct ShellConfig {
    scope: Url,
    cache_name: CacheName,
    manifest: AssetManifest,
    assets: Vec<Url>,
}

impl ShellConfig {
    /// Create a configuration, resolving every manifest path against `scope`.
    pub fn new(
        scope: Url,
        cache_name: CacheName,
        manifest: AssetManifest,
    ) -> Result<Self, ConfigError> {
        let scope = normalize_scope(scope)?;

        let mut seen = HashSet::new();
        let mut assets = Vec::with_capacity(manifest.len());
        for path in manifest.paths() {
            let url = scope
                .join(path)
                .map_err(|source| ConfigError::UnresolvableAsset {
                    path: path.clone(),
                    source,
                })?;
            // `./` and `./index.html` are distinct, but `a.js` and `./a.js` are not.
            if !seen.insert(RequestKey::from_url(&url)) {
                return Err(ConfigError::DuplicateAsset(path.clone()));
            }
            assets.push(url);
        }

        Ok(Self {
            scope,
            cache_name,
            manifest,
            assets,
        })
    }

    /// Configuration from the compiled-in constants.
    pub fn builtin(scope: Url) -> Result<Self, ConfigError> {
        Self::new(scope, CacheName::new(CACHE_NAME)?, AssetManifest::builtin())
    }

    /// Parse an embedded deployment manifest.
    ///
    /// ```toml
    /// scope = "https://app.example/"
    /// cache_name = "offline-shell-v2"
    /// assets = ["./", "./index.html"]
    /// ```
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(source)?;
        let scope = Url::parse(&raw.scope).map_err(|source| ConfigError::InvalidScope {
            url: raw.scope.clone(),
            source,
        })?;
        Self::new(
            scope,
            CacheName::new(raw.cache_name)?,
            AssetManifest::new(raw.assets)?,
        )
    }

    /// The scope URL, always ending in `/`.
    pub fn scope(&self) -> &Url {
        &self.scope
    }

    /// The current cache bucket name.
    pub fn cache_name(&self) -> &CacheName {
        &self.cache_name
    }

    /// The asset manifest.
    pub fn manifest(&self) -> &AssetManifest {
        &self.manifest
    }

    /// Absolute asset URLs, in manifest order.
    pub fn asset_urls(&self) -> &[Url] {
        &self.assets
    }

    /// GET requests for every manifest asset, in manifest order.
    pub fn asset_requests(&self) -> Vec<Request> {
        self.assets.iter().cloned().map(Request::get).collect()
    }
}

fn normalize_scope(mut scope: Url) -> Result<Url, ConfigError> {
    if !matches!(scope.scheme(), "http" | "https") {
        return Err(ConfigError::UnsupportedScope(scope.to_string()));
    }
    scope.set_query(None);
    scope.set_fragment(None);
    if !scope.path().ends_with('/') {
        let path = format!("{}/", scope.path());
        scope.set_path(&path);
    }
    Ok(scope)
}
