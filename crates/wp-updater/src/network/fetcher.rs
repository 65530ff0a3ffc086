//! Release fetching.
//!
//! `ReleaseFetcher` is the seam between the updater and the network. The
//! production implementation issues a single HTTP request and hands the body
//! to the platform adapter; tests substitute their own implementations.

use super::adapters::{self, PackageContext};
use super::client::{extract_domain, HttpClient};
use super::platform::{PlatformKind, ResolvedSource};
use crate::config::RequestOptions;
use crate::models::Release;
use crate::{Result, UpdaterError};
use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::{debug, info};

/// Everything needed to poll one package's source.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub source: ResolvedSource,
    pub options: RequestOptions,
    pub package: PackageContext,
}

/// Retrieves the newest release for a package.
#[async_trait]
pub trait ReleaseFetcher: Send + Sync {
    /// Returns `Ok(None)` when the source has no release to offer.
    async fn fetch(&self, request: &FetchRequest) -> Result<Option<Release>>;
}

/// Fetches releases over HTTP.
pub struct HttpReleaseFetcher {
    http: HttpClient,
}

impl HttpReleaseFetcher {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// Issue the request and return a non-empty body from a 200 response.
    async fn fetch_body(&self, request: &FetchRequest) -> Result<String> {
        let url = &request.source.endpoint;
        let response = self.http.send(url, &request.options).await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(UpdaterError::HttpStatus {
                url: url.clone(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| UpdaterError::Network {
            message: format!("Failed to read response from {}: {}", url, e),
            source: Some(e),
        })?;

        if body.trim().is_empty() {
            return Err(UpdaterError::EmptyResponse { url: url.clone() });
        }

        Ok(body)
    }
}

#[async_trait]
impl ReleaseFetcher for HttpReleaseFetcher {
    async fn fetch(&self, request: &FetchRequest) -> Result<Option<Release>> {
        if request.source.platform == PlatformKind::GitLab {
            debug!(
                "Skipping request for {}: GitLab sources are not supported",
                request.package.slug
            );
            return Ok(None);
        }

        let body = self.fetch_body(request).await?;
        let release = adapters::normalize(
            request.source.platform,
            &body,
            &request.package,
            &request.source.endpoint,
        )?;

        if let Some(release) = &release {
            info!(
                "Fetched release {} of {} from {}",
                release.version,
                request.package.slug,
                extract_domain(&request.source.endpoint)
            );
        }

        Ok(release)
    }
}
