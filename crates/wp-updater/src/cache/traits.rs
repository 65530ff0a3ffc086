//! Cache backend trait and types.

use crate::error::Result;
use crate::models::Release;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::time::Duration;

/// Prefix of every cache key, so entries can share a store with other data.
const CACHE_KEY_PREFIX: &str = "wp-updater-";

/// Derive the storage key for a slug.
///
/// The key is a hash of the slug, so it is stable across process restarts
/// and safe to use as a file name or database key.
pub fn cache_key(slug: &str) -> String {
    let digest = Sha256::digest(slug.as_bytes());
    format!("{}{}", CACHE_KEY_PREFIX, hex::encode(&digest[..16]))
}

/// A cached release with its lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub slug: String,
    pub release: Release,
    /// When the entry was cached.
    pub cached_at: DateTime<Utc>,
    /// When the entry expires.
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Create an entry cached at `now` that lives for `ttl`.
    pub fn new(slug: impl Into<String>, release: Release, ttl: Duration, now: DateTime<Utc>) -> Self {
        let expires_at = chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|ttl| now.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        Self {
            slug: slug.into(),
            release,
            cached_at: now,
            expires_at,
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

/// Snapshot of the cache state for one slug.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStatus {
    pub has_entry: bool,
    pub is_valid: bool,
    pub cached_version: Option<String>,
    pub age_seconds: Option<i64>,
    pub expires_in_seconds: Option<i64>,
}

/// Key-value storage for cache entries.
///
/// Backends store entries as given and return them whether or not they have
/// expired; expiry is decided by the caller.
pub trait CacheBackend: Send + Sync {
    /// Get the entry stored under `key`.
    fn get(&self, key: &str) -> Result<Option<CacheEntry>>;

    /// Store an entry, replacing any existing one.
    fn set(&self, key: &str, entry: &CacheEntry) -> Result<()>;

    /// Delete the entry under `key`. Returns whether one existed.
    fn invalidate(&self, key: &str) -> Result<bool>;

    /// Remove every entry that has expired at `now`.
    ///
    /// Returns the number of entries removed.
    fn cleanup_expired(&self, now: DateTime<Utc>) -> Result<usize>;

    /// Number of stored entries, expired ones included.
    fn len(&self) -> Result<usize>;

    fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Remove all entries.
    fn clear_all(&self) -> Result<()>;
}
