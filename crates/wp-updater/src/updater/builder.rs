//! Builder for configuring an UpdaterRegistry.

use super::registry::UpdaterRegistry;
use crate::cache::{CacheBackend, MemoryCache, SqliteCache, VersionCache};
use crate::config::NetworkConfig;
use crate::error::Result;
use crate::network::{HttpClient, HttpReleaseFetcher, PlatformResolver, ReleaseFetcher};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Where cached releases are kept.
enum CacheChoice {
    Memory,
    Sqlite(PathBuf),
    DefaultSqlite,
    Backend(Arc<dyn CacheBackend>),
}

/// Builder for configuring an [`UpdaterRegistry`].
///
/// # Example
///
/// ```rust,ignore
/// use wp_updater::UpdaterRegistry;
///
/// let registry = UpdaterRegistry::builder()
///     .persistent_cache()
///     .http_timeout(Duration::from_secs(10))
///     .build()?;
/// ```
pub struct UpdaterRegistryBuilder {
    cache: CacheChoice,
    http_timeout: Duration,
    user_agent: String,
    github_api_base: String,
    fetcher: Option<Arc<dyn ReleaseFetcher>>,
}

impl Default for UpdaterRegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl UpdaterRegistryBuilder {
    pub fn new() -> Self {
        Self {
            cache: CacheChoice::Memory,
            http_timeout: NetworkConfig::REQUEST_TIMEOUT,
            user_agent: NetworkConfig::USER_AGENT.to_string(),
            github_api_base: NetworkConfig::GITHUB_API_BASE.to_string(),
            fetcher: None,
        }
    }

    /// Keep cached releases in process memory.
    ///
    /// Default.
    pub fn memory_cache(mut self) -> Self {
        self.cache = CacheChoice::Memory;
        self
    }

    /// Persist cached releases in a SQLite database at `path`.
    pub fn sqlite_cache(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache = CacheChoice::Sqlite(path.into());
        self
    }

    /// Persist cached releases in the user's cache directory.
    pub fn persistent_cache(mut self) -> Self {
        self.cache = CacheChoice::DefaultSqlite;
        self
    }

    /// Use a custom cache backend.
    pub fn cache_backend(mut self, backend: Arc<dyn CacheBackend>) -> Self {
        self.cache = CacheChoice::Backend(backend);
        self
    }

    /// Default timeout for requests that do not set their own.
    ///
    /// Default: 15 seconds
    pub fn http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Base URL of the GitHub API, for GitHub Enterprise installations.
    ///
    /// Default: `https://api.github.com`
    pub fn github_api_base(mut self, base: impl Into<String>) -> Self {
        self.github_api_base = base.into();
        self
    }

    /// Replace the HTTP fetcher. The timeout and user agent are then unused.
    pub fn fetcher(mut self, fetcher: Arc<dyn ReleaseFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Build the registry.
    pub fn build(self) -> Result<UpdaterRegistry> {
        let backend: Arc<dyn CacheBackend> = match self.cache {
            CacheChoice::Memory => Arc::new(MemoryCache::new()),
            CacheChoice::Sqlite(path) => Arc::new(SqliteCache::new(path)?),
            CacheChoice::DefaultSqlite => Arc::new(SqliteCache::open_default()?),
            CacheChoice::Backend(backend) => backend,
        };

        let fetcher = match self.fetcher {
            Some(fetcher) => fetcher,
            None => {
                let http = HttpClient::with_options(self.http_timeout, &self.user_agent)?;
                Arc::new(HttpReleaseFetcher::new(http))
            }
        };

        Ok(UpdaterRegistry::from_parts(
            PlatformResolver::new(self.github_api_base),
            fetcher,
            VersionCache::new(backend),
        ))
    }
}
