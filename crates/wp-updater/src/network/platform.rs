//! Platform detection for update sources.
//!
//! A source URL is classified once, at registration, into the platform that
//! hosts it. The classification also fixes the endpoint that is polled for
//! release information.

use crate::config::NetworkConfig;
use crate::{Result, UpdaterError};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use url::Url;

static GITHUB_REPO_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?i:https?://github\.com)/(?P<owner>[\w-]+)/(?P<repo>[\w-]+)$")
        .expect("github repository regex must compile")
});

/// Hosting platform of an update source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformKind {
    GitHub,
    GitLab,
    Custom,
}

impl std::fmt::Display for PlatformKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PlatformKind::GitHub => "github",
            PlatformKind::GitLab => "gitlab",
            PlatformKind::Custom => "custom",
        };
        f.write_str(name)
    }
}

/// A classified source with the endpoint to poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSource {
    pub platform: PlatformKind,
    /// The URL the package was configured with.
    pub source_url: String,
    /// The URL requests are sent to.
    pub endpoint: String,
}

/// Turns source URLs into pollable endpoints.
#[derive(Debug, Clone)]
pub struct PlatformResolver {
    github_api_base: String,
}

impl Default for PlatformResolver {
    fn default() -> Self {
        Self::new(NetworkConfig::GITHUB_API_BASE)
    }
}

impl PlatformResolver {
    /// Create a resolver that builds GitHub endpoints on `github_api_base`.
    pub fn new(github_api_base: impl Into<String>) -> Self {
        let base: String = github_api_base.into();
        Self {
            github_api_base: base.trim_end_matches('/').to_string(),
        }
    }

    pub fn github_api_base(&self) -> &str {
        &self.github_api_base
    }

    /// Classify `source` and compute its endpoint.
    pub fn resolve(&self, source: &str) -> Result<ResolvedSource> {
        let source = source.trim();
        if source.is_empty() {
            return Err(UpdaterError::config(
                "You are missing the url where to update from.",
            ));
        }

        let parsed = Url::parse(source).map_err(|e| UpdaterError::MalformedSource {
            url: source.to_string(),
            reason: e.to_string(),
        })?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(UpdaterError::MalformedSource {
                url: source.to_string(),
                reason: format!("unsupported scheme {:?}", parsed.scheme()),
            });
        }

        let host = parsed.host_str().unwrap_or_default().to_ascii_lowercase();

        if host_matches(&host, NetworkConfig::GITHUB_HOST) {
            return self.resolve_github(source);
        }

        if host_matches(&host, NetworkConfig::GITLAB_HOST) {
            return Ok(ResolvedSource {
                platform: PlatformKind::GitLab,
                source_url: source.to_string(),
                endpoint: source.to_string(),
            });
        }

        Ok(ResolvedSource {
            platform: PlatformKind::Custom,
            source_url: source.to_string(),
            endpoint: source.to_string(),
        })
    }

    fn resolve_github(&self, source: &str) -> Result<ResolvedSource> {
        let captures = GITHUB_REPO_RE
            .captures(source)
            .ok_or_else(|| UpdaterError::MalformedSource {
                url: source.to_string(),
                reason: "Your GitHub repository should look like https://github.com/<owner>/<repo>"
                    .to_string(),
            })?;

        let endpoint = format!(
            "{}/repos/{}/{}/tags",
            self.github_api_base,
            urlencoding::encode(&captures["owner"]),
            urlencoding::encode(&captures["repo"])
        );

        Ok(ResolvedSource {
            platform: PlatformKind::GitHub,
            source_url: source.to_string(),
            endpoint,
        })
    }
}

fn host_matches(host: &str, platform_host: &str) -> bool {
    host == platform_host
        || host
            .strip_suffix(platform_host)
            .is_some_and(|prefix| prefix.ends_with('.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_github_source() {
        let resolved = PlatformResolver::default()
            .resolve("https://github.com/makeitworkpress/wp-components")
            .unwrap();
        assert_eq!(resolved.platform, PlatformKind::GitHub);
        assert_eq!(
            resolved.endpoint,
            "https://api.github.com/repos/makeitworkpress/wp-components/tags"
        );
        assert_eq!(
            resolved.source_url,
            "https://github.com/makeitworkpress/wp-components"
        );
    }

    #[test]
    fn test_github_host_is_case_insensitive() {
        let resolved = PlatformResolver::default()
            .resolve("HTTPS://GitHub.com/acme/widget")
            .unwrap();
        assert_eq!(resolved.platform, PlatformKind::GitHub);
        assert_eq!(
            resolved.endpoint,
            "https://api.github.com/repos/acme/widget/tags"
        );
    }

    #[test]
    fn test_github_with_custom_api_base() {
        let resolved = PlatformResolver::new("http://127.0.0.1:8080/")
            .resolve("http://github.com/acme/widget_theme")
            .unwrap();
        assert_eq!(
            resolved.endpoint,
            "http://127.0.0.1:8080/repos/acme/widget_theme/tags"
        );
    }

    #[test]
    fn test_malformed_github_sources() {
        let resolver = PlatformResolver::default();
        for source in [
            "https://github.com/onlyowner",
            "https://github.com/acme/widget/releases",
            "https://github.com/acme/widget/",
            "https://github.com/acme/wid.get",
            "https://api.github.com/repos/acme/widget",
        ] {
            let result = resolver.resolve(source);
            assert!(
                matches!(result, Err(UpdaterError::MalformedSource { .. })),
                "{} should be rejected",
                source
            );
        }
    }

    #[test]
    fn test_gitlab_source() {
        let resolved = PlatformResolver::default()
            .resolve("https://gitlab.com/acme/widget")
            .unwrap();
        assert_eq!(resolved.platform, PlatformKind::GitLab);
        assert_eq!(resolved.endpoint, "https://gitlab.com/acme/widget");
    }

    #[test]
    fn test_custom_source() {
        let resolved = PlatformResolver::default()
            .resolve("https://updates.example.com/theme.json?channel=stable")
            .unwrap();
        assert_eq!(resolved.platform, PlatformKind::Custom);
        assert_eq!(
            resolved.endpoint,
            "https://updates.example.com/theme.json?channel=stable"
        );
    }

    #[test]
    fn test_lookalike_host_is_custom() {
        let resolved = PlatformResolver::default()
            .resolve("https://notgithub.com/acme/widget")
            .unwrap();
        assert_eq!(resolved.platform, PlatformKind::Custom);
    }

    #[test]
    fn test_empty_and_unparseable_sources() {
        let resolver = PlatformResolver::default();
        assert!(matches!(resolver.resolve(""), Err(UpdaterError::Config { .. })));
        assert!(matches!(
            resolver.resolve("not a url"),
            Err(UpdaterError::MalformedSource { .. })
        ));
        assert!(matches!(
            resolver.resolve("ftp://example.com/theme.json"),
            Err(UpdaterError::MalformedSource { .. })
        ));
    }
}
