//! SQLite-based persistent cache implementation.

use super::traits::{CacheBackend, CacheEntry};
use crate::config::CacheConfig;
use crate::error::{Result, UpdaterError};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

/// SQLite-based cache backend.
///
/// Entries survive process restarts. Thread-safe via internal mutex on the
/// connection.
#[derive(Clone)]
pub struct SqliteCache {
    /// Database connection (wrapped for thread safety).
    conn: Arc<Mutex<Connection>>,
    /// Location of the database, `None` for in-memory databases.
    path: Option<PathBuf>,
}

impl SqliteCache {
    /// Open (or create) a cache at the specified database path.
    pub fn new(db_path: impl AsRef<Path>) -> Result<Self> {
        let db_path = db_path.as_ref();

        // Create parent directory if needed
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| UpdaterError::Io {
                message: format!("Failed to create cache directory: {}", e),
                path: Some(parent.to_path_buf()),
                source: Some(e),
            })?;
        }

        let conn = Connection::open(db_path).map_err(|e| UpdaterError::Database {
            message: format!("Failed to open cache database: {}", e),
            source: Some(e),
        })?;

        // Concurrent admin requests may hit the same database file
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")
            .map_err(|e| UpdaterError::Database {
                message: format!("Failed to set pragmas: {}", e),
                source: Some(e),
            })?;

        Self::from_connection(conn, Some(db_path.to_path_buf()))
    }

    /// Open the cache at the platform cache directory.
    pub fn open_default() -> Result<Self> {
        Self::new(Self::default_path()?)
    }

    /// Default database location, under the user's cache directory.
    pub fn default_path() -> Result<PathBuf> {
        let base = dirs::cache_dir().ok_or_else(|| {
            UpdaterError::config("Could not determine the user cache directory.")
        })?;
        Ok(base
            .join(CacheConfig::CACHE_DIR_NAME)
            .join(CacheConfig::DATABASE_FILE_NAME))
    }

    /// Create a cache backed by a private in-memory database.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| UpdaterError::Database {
            message: format!("Failed to open in-memory cache database: {}", e),
            source: Some(e),
        })?;
        Self::from_connection(conn, None)
    }

    fn from_connection(conn: Connection, path: Option<PathBuf>) -> Result<Self> {
        let cache = Self {
            conn: Arc::new(Mutex::new(conn)),
            path,
        };
        cache.init_schema()?;
        Ok(cache)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| UpdaterError::Database {
            message: format!("Failed to lock database: {}", e),
            source: None,
        })
    }

    /// Initialize database schema.
    fn init_schema(&self) -> Result<()> {
        let conn = self.lock()?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS release_cache (
                key TEXT PRIMARY KEY,
                slug TEXT NOT NULL,
                release TEXT NOT NULL,
                cached_at INTEGER NOT NULL,
                expires_at INTEGER NOT NULL
            );

            -- Index for expiration queries
            CREATE INDEX IF NOT EXISTS idx_release_cache_expires
                ON release_cache(expires_at);
            "#,
        )
        .map_err(|e| UpdaterError::Database {
            message: format!("Failed to initialize cache schema: {}", e),
            source: Some(e),
        })?;

        Ok(())
    }
}

fn from_millis(millis: i64, column: &str) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis).ok_or_else(|| UpdaterError::Database {
        message: format!("Invalid timestamp in column {}: {}", column, millis),
        source: None,
    })
}

impl CacheBackend for SqliteCache {
    fn get(&self, key: &str) -> Result<Option<CacheEntry>> {
        let conn = self.lock()?;

        let row: Option<(String, String, i64, i64)> = conn
            .query_row(
                "SELECT slug, release, cached_at, expires_at FROM release_cache WHERE key = ?1",
                params![key],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .optional()?;

        let Some((slug, release, cached_at, expires_at)) = row else {
            return Ok(None);
        };

        Ok(Some(CacheEntry {
            slug,
            release: serde_json::from_str(&release)?,
            cached_at: from_millis(cached_at, "cached_at")?,
            expires_at: from_millis(expires_at, "expires_at")?,
        }))
    }

    fn set(&self, key: &str, entry: &CacheEntry) -> Result<()> {
        let release = serde_json::to_string(&entry.release)?;
        let conn = self.lock()?;

        conn.execute(
            r#"
            INSERT OR REPLACE INTO release_cache (key, slug, release, cached_at, expires_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                key,
                entry.slug,
                release,
                entry.cached_at.timestamp_millis(),
                entry.expires_at.timestamp_millis()
            ],
        )
        .map_err(|e| UpdaterError::Database {
            message: format!("Failed to store cache entry for {}: {}", entry.slug, e),
            source: Some(e),
        })?;

        debug!("Stored cache entry {} for {}", key, entry.slug);
        Ok(())
    }

    fn invalidate(&self, key: &str) -> Result<bool> {
        let conn = self.lock()?;
        let deleted = conn.execute("DELETE FROM release_cache WHERE key = ?1", params![key])?;
        Ok(deleted > 0)
    }

    fn cleanup_expired(&self, now: DateTime<Utc>) -> Result<usize> {
        let conn = self.lock()?;
        let deleted = conn.execute(
            "DELETE FROM release_cache WHERE expires_at <= ?1",
            params![now.timestamp_millis()],
        )?;
        if deleted > 0 {
            debug!("Removed {} expired cache entries", deleted);
        }
        Ok(deleted)
    }

    fn len(&self) -> Result<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM release_cache", [], |row| {
            row.get(0)
        })?;
        Ok(count as usize)
    }

    fn clear_all(&self) -> Result<()> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM release_cache", [])?;
        Ok(())
    }
}
