//! In-process cache backend.

use super::traits::{CacheBackend, CacheEntry};
use crate::config::CacheConfig;
use crate::error::Result;
use chrono::{DateTime, Utc};
use mini_moka::sync::Cache;

/// Memory-backed cache. Entries are lost when the process exits.
#[derive(Clone)]
pub struct MemoryCache {
    entries: Cache<String, CacheEntry>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::with_capacity(CacheConfig::MEMORY_MAX_CAPACITY)
    }

    pub fn with_capacity(max_capacity: u64) -> Self {
        Self {
            entries: Cache::builder().max_capacity(max_capacity).build(),
        }
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheBackend for MemoryCache {
    fn get(&self, key: &str) -> Result<Option<CacheEntry>> {
        Ok(self.entries.get(&key.to_string()))
    }

    fn set(&self, key: &str, entry: &CacheEntry) -> Result<()> {
        self.entries.insert(key.to_string(), entry.clone());
        Ok(())
    }

    fn invalidate(&self, key: &str) -> Result<bool> {
        let key = key.to_string();
        let existed = self.entries.contains_key(&key);
        self.entries.invalidate(&key);
        Ok(existed)
    }

    fn cleanup_expired(&self, now: DateTime<Utc>) -> Result<usize> {
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|entry| entry.value().is_expired_at(now))
            .map(|entry| entry.key().clone())
            .collect();

        for key in &expired {
            self.entries.invalidate(key);
        }
        Ok(expired.len())
    }

    fn len(&self) -> Result<usize> {
        Ok(self.entries.iter().count())
    }

    fn clear_all(&self) -> Result<()> {
        self.entries.invalidate_all();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Release;
    use std::time::Duration;

    fn entry(slug: &str, ttl: Duration, now: DateTime<Utc>) -> CacheEntry {
        let release = Release {
            version: "1.0.0".to_string(),
            download_url: format!("https://example.com/{}.zip", slug),
            slug: slug.to_string(),
            plugin_path: None,
            source_url: "https://example.com".to_string(),
        };
        CacheEntry::new(slug, release, ttl, now)
    }

    #[test]
    fn test_set_get_invalidate() {
        let cache = MemoryCache::new();
        let now = Utc::now();
        let stored = entry("a", Duration::from_secs(60), now);

        cache.set("key-a", &stored).unwrap();
        assert_eq!(cache.get("key-a").unwrap(), Some(stored));

        assert!(cache.invalidate("key-a").unwrap());
        assert!(cache.get("key-a").unwrap().is_none());
        assert!(!cache.invalidate("key-a").unwrap());
    }

    #[test]
    fn test_cleanup_expired() {
        let cache = MemoryCache::new();
        let now = Utc::now();
        cache.set("short", &entry("short", Duration::from_secs(1), now)).unwrap();
        cache.set("long", &entry("long", Duration::from_secs(3600), now)).unwrap();

        let removed = cache
            .cleanup_expired(now + chrono::Duration::seconds(10))
            .unwrap();
        assert_eq!(removed, 1);
        assert!(cache.get("short").unwrap().is_none());
        assert!(cache.get("long").unwrap().is_some());
    }

    #[test]
    fn test_clear_all() {
        let cache = MemoryCache::new();
        let now = Utc::now();
        cache.set("a", &entry("a", Duration::from_secs(60), now)).unwrap();
        cache.set("b", &entry("b", Duration::from_secs(60), now)).unwrap();
        assert_eq!(cache.len().unwrap(), 2);

        cache.clear_all().unwrap();
        assert!(cache.get("a").unwrap().is_none());
        assert!(cache.get("b").unwrap().is_none());
    }
}
