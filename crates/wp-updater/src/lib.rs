//! wp-updater - Update resolution for WordPress themes and plugins hosted
//! outside the official directory.
//!
//! Each registered package points at a source: a GitHub repository, a GitLab
//! project or a URL serving release JSON. On the host's periodic update pass
//! the newest release is looked up (through a TTL cache), compared with the
//! installed version, and reported as an update notice. After an update is
//! downloaded, the extracted folder is renamed to what the host expects.
//!
//! # Example
//!
//! ```rust,ignore
//! use wp_updater::{PackageLocator, UpdaterConfig, UpdaterRegistry};
//!
//! #[tokio::main]
//! async fn main() -> wp_updater::Result<()> {
//!     let mut registry = UpdaterRegistry::builder().persistent_cache().build()?;
//!
//!     registry.register_discovered(
//!         UpdaterConfig::plugin("https://github.com/acme/gadget"),
//!         &PackageLocator::plugin("/var/www/wp-content/plugins", "gadget"),
//!     )?;
//!
//!     for notice in registry.check_all(false).await {
//!         println!("{} can be updated to {}", notice.slug, notice.new_version);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod network;
pub mod updater;

// Re-export commonly used types
pub use cache::{CacheBackend, MemoryCache, SqliteCache, VersionCache};
pub use config::{PackageKind, RequestOptions, UpdaterConfig};
pub use error::{Result, UpdaterError};
pub use logging::{init_logging, LogFormat};
pub use models::{InstalledPackage, Release, UpdateNotice, UpdateReport};
pub use network::{PlatformKind, ReleaseFetcher};
pub use updater::{
    compare_versions, PackageLocator, UpdaterHandle, UpdaterRegistry, UpdaterRegistryBuilder,
    UpgradeContext,
};
