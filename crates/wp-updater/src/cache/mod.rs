//! Release cache.
//!
//! Keeps the last fetched release per package for a configurable time so the
//! host's periodic checks do not poll the remote source every time:
//! - `VersionCache` is the slug-keyed view the updater talks to
//! - `MemoryCache` keeps entries in process
//! - `SqliteCache` persists entries across restarts

mod memory;
mod sqlite;
mod traits;
mod version_cache;

pub use memory::MemoryCache;
pub use sqlite::SqliteCache;
pub use traits::{cache_key, CacheBackend, CacheEntry, CacheStatus};
pub use version_cache::VersionCache;
