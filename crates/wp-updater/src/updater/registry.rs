//! The set of packages a host manages updates for.

use super::builder::UpdaterRegistryBuilder;
use super::discovery::PackageLocator;
use super::package_updater::Updater;
use super::source_selection::{normalize_source, UpgradeContext};
use crate::cache::VersionCache;
use crate::config::{PackageKind, UpdaterConfig};
use crate::error::{Result, UpdaterError};
use crate::models::{InstalledPackage, UpdateNotice, UpdateReport};
use crate::network::{PlatformResolver, ReleaseFetcher};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Shared handle to a registered [`Updater`].
#[derive(Debug, Clone)]
pub struct UpdaterHandle(Arc<Updater>);

impl Deref for UpdaterHandle {
    type Target = Updater;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Registered updaters plus the services they share.
///
/// Owned by the host's startup code; every host extension point maps to a
/// method here.
pub struct UpdaterRegistry {
    resolver: PlatformResolver,
    fetcher: Arc<dyn ReleaseFetcher>,
    cache: VersionCache,
    updaters: Vec<UpdaterHandle>,
}

impl UpdaterRegistry {
    pub fn builder() -> UpdaterRegistryBuilder {
        UpdaterRegistryBuilder::new()
    }

    pub(crate) fn from_parts(
        resolver: PlatformResolver,
        fetcher: Arc<dyn ReleaseFetcher>,
        cache: VersionCache,
    ) -> Self {
        Self {
            resolver,
            fetcher,
            cache,
            updaters: Vec::new(),
        }
    }

    /// Register a package for update checks.
    ///
    /// Fails when the configuration is invalid, the source cannot be
    /// resolved, or the slug is already registered. Nothing is registered on
    /// failure.
    pub fn register(
        &mut self,
        config: UpdaterConfig,
        installed: InstalledPackage,
    ) -> Result<UpdaterHandle> {
        config.validate()?;

        if installed.slug.trim().is_empty() {
            return Err(UpdaterError::config("Installed package has no slug"));
        }
        if self.get(&installed.slug).is_some() {
            return Err(UpdaterError::DuplicateSlug {
                slug: installed.slug,
            });
        }

        let source = self.resolver.resolve(&config.source)?;

        info!(
            "Registered {} {} {} from {} ({})",
            config.kind, installed.slug, installed.version, source.source_url, source.platform
        );

        let handle = UpdaterHandle(Arc::new(Updater::new(
            config,
            source,
            installed,
            self.fetcher.clone(),
            self.cache.clone(),
        )));
        self.updaters.push(handle.clone());
        Ok(handle)
    }

    /// Discover the installed package on disk, then register it.
    pub fn register_discovered(
        &mut self,
        config: UpdaterConfig,
        locator: &PackageLocator,
    ) -> Result<UpdaterHandle> {
        if locator.kind() != config.kind {
            return Err(UpdaterError::config(format!(
                "Configured type {} does not match the located {}",
                config.kind,
                locator.kind()
            )));
        }
        let installed = locator.discover_installed()?;
        self.register(config, installed)
    }

    pub fn updaters(&self) -> &[UpdaterHandle] {
        &self.updaters
    }

    pub fn get(&self, slug: &str) -> Option<&UpdaterHandle> {
        self.updaters.iter().find(|updater| updater.slug() == slug)
    }

    pub fn len(&self) -> usize {
        self.updaters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.updaters.is_empty()
    }

    pub fn cache(&self) -> &VersionCache {
        &self.cache
    }

    /// Add notices for every package of `kind` with a newer release.
    ///
    /// Does nothing when the host has not checked any versions yet. The
    /// version listed in `checked` is preferred over the one recorded at
    /// registration. Returns the number of notices added.
    pub async fn fill_update_report(&self, kind: PackageKind, report: &mut UpdateReport) -> usize {
        if report.checked.is_empty() {
            debug!("Skipping {} update report: nothing checked", kind);
            return 0;
        }

        let mut added = 0;
        for updater in self.updaters.iter().filter(|u| u.kind() == kind) {
            let installed_version = report
                .checked
                .get(&updater.registry_key())
                .or_else(|| report.checked.get(updater.slug()))
                .cloned()
                .unwrap_or_else(|| updater.installed().version.clone());

            if let Some(notice) = updater.on_update_check(&installed_version).await {
                report.insert(notice);
                added += 1;
            }
        }
        added
    }

    /// Host hook run after an archive is extracted and before installing it.
    ///
    /// Packages this registry does not manage pass through unchanged.
    pub fn on_upgrader_source_selection(
        &self,
        extracted: &Path,
        remote_base: &Path,
        context: &UpgradeContext,
    ) -> Result<PathBuf> {
        match self.find_by_context(context) {
            Some(updater) => {
                debug!("Normalizing extracted source for {}", updater.slug());
                normalize_source(extracted, remote_base, context.expected_name())
            }
            None => Ok(extracted.to_path_buf()),
        }
    }

    /// Host hook run after a package was installed. Returns whether a cache
    /// entry was dropped.
    pub fn on_install_complete(&self, context: &UpgradeContext) -> bool {
        match self.find_by_context(context) {
            Some(updater) => updater.invalidate_cache(),
            None => false,
        }
    }

    /// Invalidate the cached release of every registered package.
    pub fn force_recheck(&self) -> usize {
        let slugs = self.updaters.iter().map(|u| u.slug());
        match self.cache.invalidate_all(slugs) {
            Ok(removed) => {
                info!("Forced update recheck, {} cached releases dropped", removed);
                removed
            }
            Err(e) => {
                warn!("Failed to invalidate release cache: {}", e);
                0
            }
        }
    }

    /// Run the update check for every registered package.
    pub async fn check_all(&self, force: bool) -> Vec<UpdateNotice> {
        if force {
            self.force_recheck();
        }

        let mut notices = Vec::new();
        for updater in &self.updaters {
            if let Some(notice) = updater.check().await {
                notices.push(notice);
            }
        }
        notices
    }

    fn find_by_context(&self, context: &UpgradeContext) -> Option<&UpdaterHandle> {
        let kind = context.kind()?;
        let name = context.expected_name()?;
        self.updaters
            .iter()
            .find(|u| u.kind() == kind && u.installed().folder == name)
    }
}

impl std::fmt::Debug for UpdaterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdaterRegistry")
            .field("resolver", &self.resolver)
            .field("updaters", &self.updaters)
            .finish()
    }
}
