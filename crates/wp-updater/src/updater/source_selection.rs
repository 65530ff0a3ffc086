//! Source path normalization after an archive has been extracted.
//!
//! Archives downloaded from GitHub extract to folders such as
//! `acme-widget-1a2b3c4`, while the host installs a package into a folder
//! named after its slug. The extracted folder is renamed to that name before
//! installation continues.

use crate::config::PackageKind;
use crate::error::{Result, UpdaterError};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};
use tracing::{error, info};

/// What the host knows about the package being upgraded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum UpgradeContext {
    /// A theme, identified by its stylesheet (directory) name.
    Theme { stylesheet: String },
    /// A plugin, identified by its basename such as `widget/widget.php`.
    Plugin { plugin_file: String },
    /// The host did not say what is being upgraded.
    Unknown,
}

impl UpgradeContext {
    pub fn theme(stylesheet: impl Into<String>) -> Self {
        UpgradeContext::Theme {
            stylesheet: stylesheet.into(),
        }
    }

    pub fn plugin(plugin_file: impl Into<String>) -> Self {
        UpgradeContext::Plugin {
            plugin_file: plugin_file.into(),
        }
    }

    pub fn kind(&self) -> Option<PackageKind> {
        match self {
            UpgradeContext::Theme { .. } => Some(PackageKind::Theme),
            UpgradeContext::Plugin { .. } => Some(PackageKind::Plugin),
            UpgradeContext::Unknown => None,
        }
    }

    /// The folder name the host expects the package in.
    ///
    /// For plugins this is the directory part of the basename; single-file
    /// plugins have none.
    pub fn expected_name(&self) -> Option<&str> {
        let name = match self {
            UpgradeContext::Theme { stylesheet } => stylesheet.trim_matches('/'),
            UpgradeContext::Plugin { plugin_file } => plugin_file.split_once('/')?.0,
            UpgradeContext::Unknown => return None,
        };
        (!name.is_empty()).then_some(name)
    }
}

/// Move `extracted` to `remote_base/expected_name`.
///
/// Returns `extracted` unchanged when there is no expected name or it is
/// already in place. An existing destination is never replaced; that and
/// any failed rename are reported as [`UpdaterError::Rename`] and leave
/// `extracted` where it was.
pub fn normalize_source(
    extracted: &Path,
    remote_base: &Path,
    expected_name: Option<&str>,
) -> Result<PathBuf> {
    let Some(expected_name) = expected_name else {
        return Ok(extracted.to_path_buf());
    };

    let correct = remote_base.join(expected_name);

    if !is_single_component(expected_name) {
        return Err(UpdaterError::Rename {
            from: extracted.to_path_buf(),
            to: correct,
            message: format!("{:?} is not a valid folder name", expected_name),
            source: None,
        });
    }

    if correct == extracted {
        return Ok(correct);
    }

    if correct.symlink_metadata().is_ok() {
        error!(
            "Unable to rename {} to {}: destination already exists",
            extracted.display(),
            correct.display()
        );
        return Err(UpdaterError::Rename {
            from: extracted.to_path_buf(),
            to: correct,
            message: "destination already exists".to_string(),
            source: None,
        });
    }

    match std::fs::rename(extracted, &correct) {
        Ok(()) => {
            info!("Renamed {} to {}", extracted.display(), correct.display());
            Ok(correct)
        }
        Err(e) => {
            error!(
                "Unable to rename {} to {}: {}",
                extracted.display(),
                correct.display(),
                e
            );
            Err(UpdaterError::Rename {
                from: extracted.to_path_buf(),
                to: correct,
                message: e.to_string(),
                source: Some(e),
            })
        }
    }
}

fn is_single_component(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn extracted_dir(root: &Path, name: &str) -> PathBuf {
        let dir = root.join(name);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("style.css"), "/* Version: 1.0 */").unwrap();
        dir
    }

    #[test]
    fn test_expected_names() {
        assert_eq!(UpgradeContext::theme("widget").expected_name(), Some("widget"));
        assert_eq!(
            UpgradeContext::plugin("gadget/gadget.php").expected_name(),
            Some("gadget")
        );
        assert_eq!(UpgradeContext::plugin("hello.php").expected_name(), None);
        assert_eq!(UpgradeContext::theme("").expected_name(), None);
        assert_eq!(UpgradeContext::Unknown.expected_name(), None);
    }

    #[test]
    fn test_rename_to_expected_name() {
        let temp_dir = TempDir::new().unwrap();
        let remote = temp_dir.path().join("remote");
        let extracted = extracted_dir(&remote, "acme-my-plugin-1a2b3c4");

        let final_path = normalize_source(&extracted, &remote, Some("my-plugin")).unwrap();
        assert_eq!(final_path, remote.join("my-plugin"));
        assert!(final_path.join("style.css").exists());
        assert!(!extracted.exists());
    }

    #[test]
    fn test_existing_destination_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let remote = temp_dir.path().join("remote");
        let extracted = extracted_dir(temp_dir.path(), "x");
        let existing = extracted_dir(&remote, "my-plugin");

        let result = normalize_source(&extracted, &remote, Some("my-plugin"));
        assert!(matches!(result, Err(UpdaterError::Rename { .. })));
        assert!(extracted.join("style.css").exists());
        assert!(existing.join("style.css").exists());
    }

    #[test]
    fn test_without_expected_name_nothing_moves() {
        let temp_dir = TempDir::new().unwrap();
        let extracted = extracted_dir(temp_dir.path(), "x");

        let final_path = normalize_source(&extracted, temp_dir.path(), None).unwrap();
        assert_eq!(final_path, extracted);
        assert!(extracted.exists());
    }

    #[test]
    fn test_already_in_place() {
        let temp_dir = TempDir::new().unwrap();
        let extracted = extracted_dir(temp_dir.path(), "widget");

        let final_path = normalize_source(&extracted, temp_dir.path(), Some("widget")).unwrap();
        assert_eq!(final_path, extracted);
    }

    #[test]
    fn test_missing_source_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let result = normalize_source(
            &temp_dir.path().join("never-extracted"),
            temp_dir.path(),
            Some("widget"),
        );
        assert!(matches!(result, Err(UpdaterError::Rename { source: Some(_), .. })));
    }

    #[test]
    fn test_traversal_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let extracted = extracted_dir(temp_dir.path(), "x");

        for name in ["..", "../escape", "a/b", "/abs"] {
            let result = normalize_source(&extracted, temp_dir.path(), Some(name));
            assert!(matches!(result, Err(UpdaterError::Rename { .. })), "{}", name);
        }
        assert!(extracted.exists());
    }
}
