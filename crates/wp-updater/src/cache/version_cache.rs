//! Slug-keyed release cache with per-entry lifetimes.

use super::memory::MemoryCache;
use super::traits::{cache_key, CacheBackend, CacheEntry, CacheStatus};
use crate::error::Result;
use crate::models::Release;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Time-bound store of the last fetched release per package.
///
/// Reads never touch the network: a miss, an expired entry or an invalidated
/// entry all read as `None`, and the caller decides whether to fetch.
#[derive(Clone)]
pub struct VersionCache {
    backend: Arc<dyn CacheBackend>,
}

impl VersionCache {
    pub fn new(backend: Arc<dyn CacheBackend>) -> Self {
        Self { backend }
    }

    /// A cache that lives only as long as the process.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryCache::new()))
    }

    pub fn backend(&self) -> &Arc<dyn CacheBackend> {
        &self.backend
    }

    /// Get the cached release for `slug` if it has not expired.
    pub fn get(&self, slug: &str) -> Result<Option<Release>> {
        self.get_at(slug, Utc::now())
    }

    /// Like [`get`](Self::get), evaluated at `now`.
    pub fn get_at(&self, slug: &str, now: DateTime<Utc>) -> Result<Option<Release>> {
        let key = cache_key(slug);
        match self.backend.get(&key)? {
            Some(entry) if !entry.is_expired_at(now) => {
                debug!("Release cache hit for {}", slug);
                Ok(Some(entry.release))
            }
            Some(_) => {
                debug!("Release cache entry for {} expired", slug);
                self.backend.invalidate(&key)?;
                Ok(None)
            }
            None => {
                debug!("Release cache miss for {}", slug);
                Ok(None)
            }
        }
    }

    /// Store `release` for `slug`, valid for `ttl`.
    pub fn put(&self, slug: &str, release: &Release, ttl: Duration) -> Result<()> {
        self.put_at(slug, release, ttl, Utc::now())
    }

    /// Like [`put`](Self::put), cached at `now`.
    pub fn put_at(
        &self,
        slug: &str,
        release: &Release,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let entry = CacheEntry::new(slug, release.clone(), ttl, now);
        self.backend.set(&cache_key(slug), &entry)
    }

    /// Drop the entry for `slug`. Returns whether one existed.
    pub fn invalidate(&self, slug: &str) -> Result<bool> {
        let removed = self.backend.invalidate(&cache_key(slug))?;
        if removed {
            debug!("Invalidated release cache for {}", slug);
        }
        Ok(removed)
    }

    /// Drop the entries for every slug given. Returns how many existed.
    pub fn invalidate_all<'a, I>(&self, slugs: I) -> Result<usize>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut removed = 0;
        for slug in slugs {
            if self.invalidate(slug)? {
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Remove every expired entry from the backend.
    pub fn cleanup_expired(&self) -> Result<usize> {
        self.backend.cleanup_expired(Utc::now())
    }

    /// Remove everything from the backend, including other packages' entries.
    pub fn clear(&self) -> Result<()> {
        self.backend.clear_all()
    }

    /// Describe the cache state for `slug`.
    pub fn status(&self, slug: &str) -> Result<CacheStatus> {
        let now = Utc::now();
        let Some(entry) = self.backend.get(&cache_key(slug))? else {
            return Ok(CacheStatus::default());
        };

        Ok(CacheStatus {
            has_entry: true,
            is_valid: !entry.is_expired_at(now),
            cached_version: Some(entry.release.version.clone()),
            age_seconds: Some(now.signed_duration_since(entry.cached_at).num_seconds()),
            expires_in_seconds: Some(entry.expires_at.signed_duration_since(now).num_seconds()),
        })
    }
}
