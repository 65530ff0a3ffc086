//! Update checks and host integration.
//!
//! This module provides:
//! - Version ordering and the update decision
//! - `Updater`, the read-through update check for one package
//! - `UpdaterRegistry`, which maps the host's extension points onto the
//!   registered updaters
//! - Discovery of installed themes and plugins
//! - Normalization of extracted archive paths

mod builder;
mod decision;
mod discovery;
mod package_updater;
mod registry;
mod source_selection;
mod version;

pub use builder::UpdaterRegistryBuilder;
pub use decision::decide;
pub use discovery::{parse_header_field, read_header_field, PackageLocator};
pub use package_updater::Updater;
pub use registry::{UpdaterHandle, UpdaterRegistry};
pub use source_selection::{normalize_source, UpgradeContext};
pub use version::{compare_versions, is_newer_version, PackageVersion};
