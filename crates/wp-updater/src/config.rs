//! Configuration for registered packages and network defaults.
//!
//! `UpdaterConfig` is what a host passes when it registers a theme or plugin.
//! Omitted fields fall back to the same defaults the host integration has
//! always used: a GET request, a twelve hour cache and the theme type.

use crate::error::{Result, UpdaterError};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Defaults applied to every registered package.
pub struct UpdaterDefaults;

impl UpdaterDefaults {
    /// Default cache lifetime for update requests (12 hours).
    pub const CACHE_TTL_SECS: u64 = 43_200;
    pub const REQUEST_METHOD: &'static str = "GET";
    /// Bytes read from a theme or plugin file when looking for its header.
    pub const HEADER_READ_BYTES: usize = 8_192;
    pub const THEME_STYLESHEET: &'static str = "style.css";
    pub const PLUGIN_EXTENSION: &'static str = "php";
}

/// Network-related configuration.
pub struct NetworkConfig;

impl NetworkConfig {
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
    pub const USER_AGENT: &'static str = concat!("wp-updater/", env!("CARGO_PKG_VERSION"));
    pub const GITHUB_HOST: &'static str = "github.com";
    pub const GITLAB_HOST: &'static str = "gitlab.com";
    pub const GITHUB_API_BASE: &'static str = "https://api.github.com";
}

/// Cache storage configuration.
pub struct CacheConfig;

impl CacheConfig {
    /// Upper bound on in-memory entries; one entry per registered package.
    pub const MEMORY_MAX_CAPACITY: u64 = 1_024;
    pub const DATABASE_FILE_NAME: &'static str = "release-cache.sqlite";
    pub const CACHE_DIR_NAME: &'static str = "wp-updater";
}

/// The kind of package an updater manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PackageKind {
    #[default]
    Theme,
    Plugin,
}

impl PackageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PackageKind::Theme => "theme",
            PackageKind::Plugin => "plugin",
        }
    }
}

impl std::fmt::Display for PackageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options for the request made to the remote source.
///
/// These let a host pass extra data along, such as a license key as a header
/// or a query parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestOptions {
    pub method: String,
    pub headers: BTreeMap<String, String>,
    pub query: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// Overrides the client-wide request timeout.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: UpdaterDefaults::REQUEST_METHOD.to_string(),
            headers: BTreeMap::new(),
            query: BTreeMap::new(),
            body: None,
            timeout_secs: None,
        }
    }
}

impl RequestOptions {
    /// Parse the configured HTTP method.
    pub fn http_method(&self) -> Result<Method> {
        let method = self.method.trim().to_ascii_uppercase();
        if method.is_empty() {
            return Err(UpdaterError::config("Request method is empty."));
        }
        Method::from_bytes(method.as_bytes()).map_err(|e| {
            UpdaterError::config(format!("Invalid request method {:?}: {}", self.method, e))
        })
    }

    /// Per-request timeout, if one is configured.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    fn has_header(&self, name: &str) -> bool {
        self.headers.keys().any(|key| key.eq_ignore_ascii_case(name))
    }

    /// Fold an opaque token into the options.
    ///
    /// The token becomes a query parameter when `query_param` is given and a
    /// bearer `Authorization` header otherwise. Explicitly configured
    /// headers and parameters are left alone.
    pub fn with_token(mut self, token: Option<&str>, query_param: Option<&str>) -> Self {
        let Some(token) = token.filter(|t| !t.is_empty()) else {
            return self;
        };

        match query_param {
            Some(param) => {
                self.query
                    .entry(param.to_string())
                    .or_insert_with(|| token.to_string());
            }
            None if !self.has_header("authorization") => {
                self.headers
                    .insert("Authorization".to_string(), format!("Bearer {}", token));
            }
            None => {}
        }
        self
    }
}

/// Configuration for one registered theme or plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdaterConfig {
    /// Where to retrieve updates from: a GitHub repository, a GitLab project
    /// or a URL serving release JSON.
    pub source: String,
    pub request: RequestOptions,
    /// Cache lifetime in seconds.
    pub cache: u64,
    #[serde(rename = "type")]
    pub kind: PackageKind,
    /// Optional license key or token sent with the request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Send the token as this query parameter instead of a header.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_query_param: Option<String>,
}

impl Default for UpdaterConfig {
    fn default() -> Self {
        Self {
            source: String::new(),
            request: RequestOptions::default(),
            cache: UpdaterDefaults::CACHE_TTL_SECS,
            kind: PackageKind::default(),
            token: None,
            token_query_param: None,
        }
    }
}

impl UpdaterConfig {
    pub fn new(source: impl Into<String>, kind: PackageKind) -> Self {
        Self {
            source: source.into(),
            kind,
            ..Default::default()
        }
    }

    pub fn theme(source: impl Into<String>) -> Self {
        Self::new(source, PackageKind::Theme)
    }

    pub fn plugin(source: impl Into<String>) -> Self {
        Self::new(source, PackageKind::Plugin)
    }

    /// Parse a configuration from JSON, applying defaults for omitted fields.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| UpdaterError::Config {
            message: format!("Invalid updater configuration: {}", e),
        })
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache = ttl.as_secs();
        self
    }

    pub fn with_request(mut self, request: RequestOptions) -> Self {
        self.request = request;
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache)
    }

    /// Request options with the token folded in.
    pub fn effective_request(&self) -> RequestOptions {
        self.request
            .clone()
            .with_token(self.token.as_deref(), self.token_query_param.as_deref())
    }

    /// Check that everything needed to register the package is present.
    pub fn validate(&self) -> Result<()> {
        if self.source.trim().is_empty() {
            return Err(UpdaterError::config(
                "You are missing the url where to update from.",
            ));
        }
        self.request.http_method()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_json() {
        let config = UpdaterConfig::from_json(r#"{"source": "https://example.com/update.json"}"#)
            .unwrap();
        assert_eq!(config.cache, 43_200);
        assert_eq!(config.kind, PackageKind::Theme);
        assert_eq!(config.request.method, "GET");
        assert!(config.token.is_none());
    }

    #[test]
    fn test_plugin_type_from_json() {
        let config = UpdaterConfig::from_json(
            r#"{"source": "https://github.com/acme/widget", "type": "plugin", "cache": 60}"#,
        )
        .unwrap();
        assert_eq!(config.kind, PackageKind::Plugin);
        assert_eq!(config.cache_ttl(), Duration::from_secs(60));
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let result = UpdaterConfig::from_json(r#"{"source": "x", "type": "widget"}"#);
        assert!(matches!(result, Err(UpdaterError::Config { .. })));
    }

    #[test]
    fn test_validate_requires_source() {
        let config = UpdaterConfig::theme("  ");
        assert!(matches!(config.validate(), Err(UpdaterError::Config { .. })));
    }

    #[test]
    fn test_validate_rejects_bad_method() {
        let mut config = UpdaterConfig::theme("https://example.com/update.json");
        config.request.method = "GE T".to_string();
        assert!(config.validate().is_err());

        config.request.method = "post".to_string();
        assert!(config.validate().is_ok());
        assert_eq!(config.request.http_method().unwrap(), Method::POST);
    }

    #[test]
    fn test_token_as_bearer_header() {
        let config = UpdaterConfig::plugin("https://example.com/update.json").with_token("abc123");
        let request = config.effective_request();
        assert_eq!(request.headers.get("Authorization").unwrap(), "Bearer abc123");
        assert!(request.query.is_empty());
    }

    #[test]
    fn test_token_as_query_param() {
        let mut config =
            UpdaterConfig::plugin("https://example.com/update.json").with_token("abc123");
        config.token_query_param = Some("license".to_string());
        let request = config.effective_request();
        assert_eq!(request.query.get("license").unwrap(), "abc123");
        assert!(request.headers.is_empty());
    }

    #[test]
    fn test_explicit_authorization_header_wins() {
        let request = RequestOptions::default()
            .with_header("authorization", "token xyz")
            .with_token(Some("abc123"), None);
        assert_eq!(request.headers.len(), 1);
        assert_eq!(request.headers.get("authorization").unwrap(), "token xyz");
    }
}
