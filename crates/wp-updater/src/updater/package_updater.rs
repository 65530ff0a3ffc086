//! Update checks for a single registered package.

use super::decision::decide;
use crate::cache::VersionCache;
use crate::config::{PackageKind, UpdaterConfig};
use crate::models::{InstalledPackage, Release, UpdateNotice};
use crate::network::{FetchRequest, PackageContext, PlatformKind, ReleaseFetcher, ResolvedSource};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Checks one theme or plugin against its remote source.
///
/// Releases are read through the shared [`VersionCache`]; the remote source
/// is only polled on a miss. Fetch failures never reach the caller and read
/// as "no update".
pub struct Updater {
    config: UpdaterConfig,
    installed: InstalledPackage,
    request: FetchRequest,
    fetcher: Arc<dyn ReleaseFetcher>,
    cache: VersionCache,
}

impl Updater {
    pub(crate) fn new(
        config: UpdaterConfig,
        source: ResolvedSource,
        installed: InstalledPackage,
        fetcher: Arc<dyn ReleaseFetcher>,
        cache: VersionCache,
    ) -> Self {
        let package = PackageContext {
            kind: config.kind,
            slug: installed.slug.clone(),
            folder: installed.folder.clone(),
            source_url: source.source_url.clone(),
        };
        let request = FetchRequest {
            source,
            options: config.effective_request(),
            package,
        };

        Self {
            config,
            installed,
            request,
            fetcher,
            cache,
        }
    }

    pub fn slug(&self) -> &str {
        &self.installed.slug
    }

    pub fn kind(&self) -> PackageKind {
        self.config.kind
    }

    pub fn platform(&self) -> PlatformKind {
        self.request.source.platform
    }

    pub fn endpoint(&self) -> &str {
        &self.request.source.endpoint
    }

    pub fn config(&self) -> &UpdaterConfig {
        &self.config
    }

    pub fn installed(&self) -> &InstalledPackage {
        &self.installed
    }

    /// Key the host uses for this package in its update registry:
    /// `folder/slug.php` for plugins, the slug for themes.
    pub fn registry_key(&self) -> String {
        self.request
            .package
            .plugin_path()
            .unwrap_or_else(|| self.installed.slug.clone())
    }

    /// The newest known release, from the cache or the remote source.
    ///
    /// `force` skips the cache read; a fetched release is cached either way.
    /// "No release" results are not cached.
    pub async fn current_release(&self, force: bool) -> Option<Release> {
        let slug = self.slug();

        if !force {
            match self.cache.get(slug) {
                Ok(Some(release)) => return Some(release),
                Ok(None) => {}
                Err(e) => warn!("Failed to read release cache for {}: {}", slug, e),
            }
        }

        let release = match self.fetcher.fetch(&self.request).await {
            Ok(Some(release)) => release,
            Ok(None) => {
                debug!("No release available for {}", slug);
                return None;
            }
            Err(e) if e.is_fetch_failure() => {
                warn!(
                    "Failed to fetch release for {} from {}: {}",
                    slug,
                    self.endpoint(),
                    e
                );
                return None;
            }
            Err(e) => {
                error!("Update check for {} failed: {}", slug, e);
                return None;
            }
        };

        if let Err(e) = self.cache.put(slug, &release, self.config.cache_ttl()) {
            warn!("Failed to cache release for {}: {}", slug, e);
        }

        Some(release)
    }

    /// Host hook for the periodic update pass.
    pub async fn on_update_check(&self, installed_version: &str) -> Option<UpdateNotice> {
        let release = self.current_release(false).await?;
        let notice = decide(installed_version, &release)?;
        info!(
            "Update available for {}: {} -> {}",
            self.slug(),
            installed_version,
            notice.new_version
        );
        Some(notice)
    }

    /// Check against the version recorded at registration.
    pub async fn check(&self) -> Option<UpdateNotice> {
        self.on_update_check(&self.installed.version).await
    }

    /// Drop the cached release so the next check polls the source.
    pub fn invalidate_cache(&self) -> bool {
        match self.cache.invalidate(self.slug()) {
            Ok(removed) => removed,
            Err(e) => {
                warn!("Failed to invalidate release cache for {}: {}", self.slug(), e);
                false
            }
        }
    }
}

impl std::fmt::Debug for Updater {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Updater")
            .field("slug", &self.installed.slug)
            .field("kind", &self.config.kind)
            .field("platform", &self.request.source.platform)
            .field("endpoint", &self.request.source.endpoint)
            .finish()
    }
}
