use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Normalized metadata about the newest release available remotely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    #[serde(rename = "new_version")]
    pub version: String,
    #[serde(rename = "package")]
    pub download_url: String,
    pub slug: String,
    #[serde(rename = "plugin", default, skip_serializing_if = "Option::is_none")]
    pub plugin_path: Option<String>,
    #[serde(rename = "url")]
    pub source_url: String,
}

impl Release {
    /// A release without a version means nothing was found upstream.
    pub fn has_version(&self) -> bool {
        !self.version.trim().is_empty()
    }
}

/// An installed theme or plugin, as discovered by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledPackage {
    pub slug: String,
    pub version: String,
    /// Name of the directory the package is installed in.
    pub folder: String,
}

impl InstalledPackage {
    pub fn new(
        slug: impl Into<String>,
        version: impl Into<String>,
        folder: impl Into<String>,
    ) -> Self {
        Self {
            slug: slug.into(),
            version: version.into(),
            folder: folder.into(),
        }
    }
}

/// Handed back to the host when a newer version is available.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateNotice {
    pub slug: String,
    pub new_version: String,
    #[serde(rename = "package")]
    pub download_url: String,
    #[serde(rename = "plugin", default, skip_serializing_if = "Option::is_none")]
    pub plugin_path: Option<String>,
    /// Where the release was found.
    #[serde(rename = "url")]
    pub source_url: String,
}

impl UpdateNotice {
    /// Key of this notice in the host's update registry.
    ///
    /// Plugins are addressed by their installer-visible file path, themes by
    /// their slug.
    pub fn registry_key(&self) -> &str {
        match self.plugin_path.as_deref() {
            Some(path) if !path.is_empty() => path,
            _ => &self.slug,
        }
    }
}

impl From<&Release> for UpdateNotice {
    fn from(release: &Release) -> Self {
        Self {
            slug: release.slug.clone(),
            new_version: release.version.clone(),
            download_url: release.download_url.clone(),
            plugin_path: release.plugin_path.clone(),
            source_url: release.source_url.clone(),
        }
    }
}

/// The host's update registry for a single check pass.
///
/// `checked` lists the installed versions the host knows about; `response`
/// collects the notices for packages that have a newer release.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateReport {
    #[serde(default)]
    pub checked: BTreeMap<String, String>,
    #[serde(default)]
    pub response: BTreeMap<String, UpdateNotice>,
}

impl UpdateReport {
    pub fn with_checked<I, K, V>(checked: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            checked: checked
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            response: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, notice: UpdateNotice) {
        self.response.insert(notice.registry_key().to_string(), notice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn release(plugin_path: Option<&str>) -> Release {
        Release {
            version: "1.2.0".to_string(),
            download_url: "https://example.com/widget.zip".to_string(),
            slug: "widget".to_string(),
            plugin_path: plugin_path.map(str::to_string),
            source_url: "https://example.com".to_string(),
        }
    }

    #[test]
    fn test_registry_key_prefers_plugin_path() {
        let notice = UpdateNotice::from(&release(Some("widget/widget.php")));
        assert_eq!(notice.registry_key(), "widget/widget.php");
    }

    #[test]
    fn test_registry_key_falls_back_to_slug() {
        assert_eq!(UpdateNotice::from(&release(None)).registry_key(), "widget");
        assert_eq!(UpdateNotice::from(&release(Some(""))).registry_key(), "widget");
    }

    #[test]
    fn test_release_wire_names() {
        let json = serde_json::to_value(release(None)).unwrap();
        assert_eq!(json["new_version"], "1.2.0");
        assert_eq!(json["package"], "https://example.com/widget.zip");
        assert_eq!(json["url"], "https://example.com");
        assert!(json.get("plugin").is_none());
    }

    #[test]
    fn test_blank_version_is_not_a_release() {
        let mut r = release(None);
        r.version = "  ".to_string();
        assert!(!r.has_version());
    }
}
