//! Per-platform normalization of response bodies into `Release` records.
//!
//! Every adapter returns `Ok(None)` when the source has nothing to offer and
//! an error only when the body cannot be understood at all.

use super::platform::PlatformKind;
use crate::config::{PackageKind, UpdaterDefaults};
use crate::models::{CustomReleasePayload, GitHubTag, Release};
use crate::{Result, UpdaterError};
use tracing::{debug, warn};

/// What the adapters need to know about the package being checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageContext {
    pub kind: PackageKind,
    pub slug: String,
    pub folder: String,
    /// The source URL the package was registered with.
    pub source_url: String,
}

impl PackageContext {
    /// Installer-visible path of a plugin's main file, `folder/slug.php`.
    pub fn plugin_path(&self) -> Option<String> {
        match self.kind {
            PackageKind::Plugin => Some(format!(
                "{}/{}.{}",
                self.folder.trim_end_matches('/'),
                self.slug,
                UpdaterDefaults::PLUGIN_EXTENSION
            )),
            PackageKind::Theme => None,
        }
    }
}

/// Normalize a response body according to the source platform.
pub fn normalize(
    platform: PlatformKind,
    body: &str,
    package: &PackageContext,
    endpoint: &str,
) -> Result<Option<Release>> {
    match platform {
        PlatformKind::GitHub => normalize_github_tags(body, package, endpoint),
        PlatformKind::GitLab => {
            debug!(
                "GitLab sources are not supported yet, reporting no release for {}",
                package.slug
            );
            Ok(None)
        }
        PlatformKind::Custom => normalize_custom(body, package, endpoint),
    }
}

/// Pick the newest entry of a GitHub tags listing.
///
/// Tags are ordered with plain string comparison and the last one wins, so
/// tag names have to sort lexicographically in release order.
pub fn normalize_github_tags(
    body: &str,
    package: &PackageContext,
    endpoint: &str,
) -> Result<Option<Release>> {
    let mut tags: Vec<GitHubTag> =
        serde_json::from_str(body).map_err(|e| UpdaterError::MalformedResponse {
            url: endpoint.to_string(),
            message: format!("Failed to parse GitHub tags: {}", e),
        })?;

    tags.sort_by(|a, b| a.name.cmp(&b.name));

    let Some(newest) = tags.pop() else {
        debug!("No tags found for {}", package.slug);
        return Ok(None);
    };

    if newest.name.trim().is_empty() {
        return Ok(None);
    }

    Ok(Some(Release {
        version: newest.name,
        download_url: newest.zipball_url,
        slug: package.slug.clone(),
        plugin_path: package.plugin_path(),
        source_url: package.source_url.clone(),
    }))
}

/// Read a release document served by a custom endpoint.
pub fn normalize_custom(
    body: &str,
    package: &PackageContext,
    endpoint: &str,
) -> Result<Option<Release>> {
    let payload: CustomReleasePayload =
        serde_json::from_str(body).map_err(|e| UpdaterError::MalformedResponse {
            url: endpoint.to_string(),
            message: format!("Failed to parse release document: {}", e),
        })?;

    let version = match payload.new_version {
        Some(version) if !version.trim().is_empty() => version,
        _ => {
            debug!("Release document for {} has no new_version", package.slug);
            return Ok(None);
        }
    };

    let download_url = match payload.package {
        Some(url) if !url.trim().is_empty() => url,
        _ => {
            warn!(
                "Release document for {} offers {} without a package URL",
                package.slug, version
            );
            return Ok(None);
        }
    };

    Ok(Some(Release {
        version,
        download_url,
        slug: payload
            .slug
            .filter(|slug| !slug.is_empty())
            .unwrap_or_else(|| package.slug.clone()),
        plugin_path: payload
            .plugin
            .filter(|plugin| !plugin.is_empty())
            .or_else(|| package.plugin_path()),
        source_url: payload
            .url
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| package.source_url.clone()),
    }))
}
