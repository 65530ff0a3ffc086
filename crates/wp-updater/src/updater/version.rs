//! Version ordering used for the update decision.
//!
//! Versions are compared segment by segment as numbers (`1.9 < 1.10`), with
//! missing trailing segments counting as zero. A pre-release suffix after
//! `-` sorts before the plain version. Suffixes are compared in lowercase by
//! semver precedence, which keeps `alpha < beta < rc` regardless of how the
//! author capitalized them. A suffix that is not valid semver (`beta.01`,
//! `beta_1`) is compared as a plain string. Build metadata after `+` is
//! ignored.

use semver::Prerelease;
use std::cmp::Ordering;

/// The part of a version after `-`.
#[derive(Debug, Clone)]
enum PreRelease {
    None,
    Semver(Prerelease),
    Raw(String),
}

impl PreRelease {
    fn parse(suffix: &str) -> Self {
        let suffix = suffix.to_ascii_lowercase();
        match Prerelease::new(&suffix) {
            Ok(pre) if pre.is_empty() => PreRelease::None,
            Ok(pre) => PreRelease::Semver(pre),
            Err(_) => PreRelease::Raw(suffix),
        }
    }

    fn as_str(&self) -> &str {
        match self {
            PreRelease::None => "",
            PreRelease::Semver(pre) => pre.as_str(),
            PreRelease::Raw(raw) => raw,
        }
    }
}

impl Ord for PreRelease {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (PreRelease::None, PreRelease::None) => Ordering::Equal,
            (PreRelease::None, _) => Ordering::Greater,
            (_, PreRelease::None) => Ordering::Less,
            (PreRelease::Semver(a), PreRelease::Semver(b)) => a.cmp(b),
            (a, b) => a.as_str().cmp(b.as_str()),
        }
    }
}

impl PartialOrd for PreRelease {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for PreRelease {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PreRelease {}

/// A parsed package version.
#[derive(Debug, Clone)]
pub struct PackageVersion {
    segments: Vec<u64>,
    pre: PreRelease,
}

impl PackageVersion {
    /// Parse a version such as `1.2`, `v2.0.1` or `1.0.0-beta.2`.
    pub fn parse(version: &str) -> Option<Self> {
        let version = version.trim();
        let version = version
            .strip_prefix('v')
            .or_else(|| version.strip_prefix('V'))
            .unwrap_or(version);
        let version = version.split('+').next().unwrap_or_default();

        let (core, pre) = match version.split_once('-') {
            Some((core, pre)) => (core, PreRelease::parse(pre)),
            None => (version, PreRelease::None),
        };

        if core.is_empty() {
            return None;
        }

        let segments = core
            .split('.')
            .map(|segment| segment.parse::<u64>().ok())
            .collect::<Option<Vec<_>>>()?;

        Some(Self { segments, pre })
    }

    pub fn segments(&self) -> &[u64] {
        &self.segments
    }

    pub fn is_prerelease(&self) -> bool {
        !matches!(self.pre, PreRelease::None)
    }
}

impl Ord for PackageVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.segments.len().max(other.segments.len());
        for i in 0..len {
            let a = self.segments.get(i).copied().unwrap_or(0);
            let b = other.segments.get(i).copied().unwrap_or(0);
            match a.cmp(&b) {
                Ordering::Equal => continue,
                ordering => return ordering,
            }
        }

        self.pre.cmp(&other.pre)
    }
}

impl PartialOrd for PackageVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for PackageVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PackageVersion {}

/// Compare two version strings. `None` when either does not parse.
pub fn compare_versions(a: &str, b: &str) -> Option<Ordering> {
    Some(PackageVersion::parse(a)?.cmp(&PackageVersion::parse(b)?))
}

/// Whether `latest` is strictly newer than `installed`.
#[must_use]
pub fn is_newer_version(latest: &str, installed: &str) -> bool {
    compare_versions(latest, installed) == Some(Ordering::Greater)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_comparison() {
        assert!(is_newer_version("1.10.0", "1.2.0"));
        assert!(is_newer_version("1.10", "1.9"));
        assert!(is_newer_version("1.9.1", "1.9"));
        assert!(is_newer_version("2.0.0", "1.9.9"));
        assert!(is_newer_version("1.0.1", "1.0.0"));
        assert!(is_newer_version("v1.1", "1.0"));
        assert!(!is_newer_version("1.0.0", "1.0.0"));
        assert!(!is_newer_version("1.9", "1.9.0"));
        assert!(!is_newer_version("1.2.0", "1.10.0"));
        assert!(!is_newer_version("0.9.0", "1.0.0"));
    }

    #[test]
    fn test_prerelease_ordering() {
        assert!(is_newer_version("1.0.0", "1.0.0-beta.2"));
        assert!(is_newer_version("1.0.0-beta.10", "1.0.0-beta.2"));
        assert!(is_newer_version("1.0.0-rc.1", "1.0.0-beta.9"));
        assert!(!is_newer_version("1.0.0-beta.2", "1.0.0"));
        assert!(is_newer_version("1.0.1-alpha", "1.0.0"));
    }

    #[test]
    fn test_non_semver_prerelease_suffix() {
        assert!(is_newer_version("1.0.0-beta.01", "0.9"));
        assert!(is_newer_version("1.0.0", "1.0.0-beta_1"));
        assert!(is_newer_version("1.0.0-beta_2", "1.0.0-beta_1"));
        assert!(is_newer_version("1.0.0-beta.02", "1.0.0-beta.01"));
        assert_eq!(
            compare_versions("2.0-beta.01", "2.0-beta.01"),
            Some(Ordering::Equal)
        );
    }

    #[test]
    fn test_prerelease_case_is_ignored() {
        assert!(is_newer_version("5.8-RC1", "5.8-beta1"));
        assert!(is_newer_version("5.8-beta1", "5.8-Alpha2"));
        assert_eq!(compare_versions("5.8-RC1", "5.8-rc1"), Some(Ordering::Equal));
    }

    #[test]
    fn test_build_metadata_is_ignored() {
        assert_eq!(
            compare_versions("1.0.0+build.5", "1.0.0"),
            Some(Ordering::Equal)
        );
    }

    #[test]
    fn test_unparseable_versions() {
        assert_eq!(compare_versions("", "1.0.0"), None);
        assert_eq!(compare_versions("1.0.0", "latest"), None);
        assert_eq!(compare_versions("1..0", "1.0"), None);
        assert!(!is_newer_version("nightly", "1.0.0"));
        assert!(!is_newer_version("1.0.0", ""));
    }

    #[test]
    fn test_parse() {
        let version = PackageVersion::parse(" v3.4.5-rc.1+sha.abc ").unwrap();
        assert_eq!(version.segments(), &[3, 4, 5]);
        assert!(version.is_prerelease());
        assert_eq!(
            PackageVersion::parse("1.9").unwrap(),
            PackageVersion::parse("1.9.0").unwrap()
        );
    }
}
