//! Discovery of installed themes and plugins.
//!
//! Themes declare their version in the header of `style.css`, plugins in the
//! header comment of their main PHP file. Only the first few kilobytes of a
//! file are read, as the host does.

use crate::config::{PackageKind, UpdaterDefaults};
use crate::error::{Result, UpdaterError};
use crate::models::InstalledPackage;
use regex::Regex;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Where an installed package lives on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageLocator {
    /// A theme directory containing `style.css`.
    Theme { directory: PathBuf },
    /// A plugin whose main file is `<plugins_dir>/<slug>/<slug>.php`.
    Plugin { plugins_dir: PathBuf, slug: String },
}

impl PackageLocator {
    pub fn theme(directory: impl Into<PathBuf>) -> Self {
        PackageLocator::Theme {
            directory: directory.into(),
        }
    }

    pub fn plugin(plugins_dir: impl Into<PathBuf>, slug: impl Into<String>) -> Self {
        PackageLocator::Plugin {
            plugins_dir: plugins_dir.into(),
            slug: slug.into(),
        }
    }

    pub fn kind(&self) -> PackageKind {
        match self {
            PackageLocator::Theme { .. } => PackageKind::Theme,
            PackageLocator::Plugin { .. } => PackageKind::Plugin,
        }
    }

    /// The file carrying the package header.
    pub fn main_file(&self) -> PathBuf {
        match self {
            PackageLocator::Theme { directory } => {
                directory.join(UpdaterDefaults::THEME_STYLESHEET)
            }
            PackageLocator::Plugin { plugins_dir, slug } => plugins_dir
                .join(slug)
                .join(format!("{}.{}", slug, UpdaterDefaults::PLUGIN_EXTENSION)),
        }
    }

    /// Read slug, version and folder of the installed package.
    pub fn discover_installed(&self) -> Result<InstalledPackage> {
        let main_file = self.main_file();

        let slug = match self {
            PackageLocator::Theme { directory } => directory
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .ok_or_else(|| UpdaterError::Discovery {
                    path: directory.clone(),
                    message: "Theme directory has no name".to_string(),
                })?,
            PackageLocator::Plugin { slug, .. } => slug.clone(),
        };

        let version = read_header_field(&main_file, "Version")?.ok_or_else(|| {
            UpdaterError::Discovery {
                path: main_file.clone(),
                message: "No Version header found".to_string(),
            }
        })?;

        debug!("Discovered {} {} {}", self.kind(), slug, version);

        Ok(InstalledPackage {
            folder: slug.clone(),
            slug,
            version,
        })
    }
}

/// Read a header field from the start of `path`.
pub fn read_header_field(path: &Path, field: &str) -> Result<Option<String>> {
    let file = std::fs::File::open(path).map_err(|e| UpdaterError::Discovery {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let mut buffer = Vec::with_capacity(UpdaterDefaults::HEADER_READ_BYTES);
    file.take(UpdaterDefaults::HEADER_READ_BYTES as u64)
        .read_to_end(&mut buffer)
        .map_err(|e| UpdaterError::io_with_path(e, path))?;

    Ok(parse_header_field(&String::from_utf8_lossy(&buffer), field))
}

/// Find `field: value` in a header comment block.
pub fn parse_header_field(contents: &str, field: &str) -> Option<String> {
    let pattern = format!(
        r"(?mi)^(?:[ \t]*<\?php)?[ \t/*#@]*{}:(.*)$",
        regex::escape(field)
    );
    let re = Regex::new(&pattern).ok()?;
    let contents = contents.replace('\r', "\n");

    let raw = re.captures(&contents)?.get(1)?.as_str();
    let value = cleanup_header_comment(raw);
    (!value.is_empty()).then_some(value)
}

fn cleanup_header_comment(value: &str) -> String {
    let value = value.trim();
    let value = match value.find("*/") {
        Some(idx) => &value[..idx],
        None => value,
    };
    let value = match value.find("?>") {
        Some(idx) => &value[..idx],
        None => value,
    };
    value.trim().to_string()
}
