//! Cache Store Module
//!
//! `ResponseCache`: SQLite-backed key/value store with lazy TTL expiry,
//! hit counting and size-bounded eviction.
//!
//! Every public operation opens its own connection, runs to completion and
//! drops it. Conflicting writers are serialized by SQLite itself; there is no
//! in-process lock. Read and write paths never fail outward: problems are
//! logged and reported as a miss or `false`.

use std::fmt::Display;
use std::path::{Path, PathBuf};

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, warn};

use super::entry::expiry_from;
use super::eviction::{evict_if_needed, total_size};
use super::schema::{ensure_schema, open_connection};
use crate::cache::{
    derive_key, format_timestamp, key_preview, parse_timestamp, CacheStats, EntryMetadata,
    DB_FILE_NAME, TOP_ENTRIES_LIMIT,
};
use crate::config::Config;
use crate::error::{CacheError, Result};

// == Response Cache ==
/// Persistent, size-bounded, TTL-aware response cache.
///
/// Holds only its location and limits, so clones are cheap and can be shared
/// freely between threads.
#[derive(Debug, Clone)]
pub struct ResponseCache {
    /// Directory containing the store
    cache_directory: PathBuf,
    /// Path of the SQLite file
    db_path: PathBuf,
    /// Ceiling on the sum of stored payload sizes
    max_size_bytes: u64,
    /// TTL in seconds applied when `set` gets none
    default_ttl: i64,
}

impl ResponseCache {
    // == Constructor ==
    /// Opens or creates a cache in `cache_directory`.
    ///
    /// Creates the directory (with parents) and the schema if missing.
    /// Failing here is fatal: the cache cannot work without its store.
    pub fn new(
        cache_directory: impl Into<PathBuf>,
        max_size_bytes: u64,
        default_ttl: i64,
    ) -> Result<Self> {
        let cache_directory = cache_directory.into();
        std::fs::create_dir_all(&cache_directory).map_err(|source| {
            CacheError::CreateDirectory {
                path: cache_directory.clone(),
                source,
            }
        })?;

        let db_path = cache_directory.join(DB_FILE_NAME);
        let conn = open_connection(&db_path)?;
        ensure_schema(&conn)?;

        info!(
            path = %db_path.display(),
            max_size_bytes,
            default_ttl,
            "Response cache ready"
        );

        Ok(Self {
            cache_directory,
            db_path,
            max_size_bytes,
            default_ttl,
        })
    }

    /// Opens the cache described by `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.cache_directory.clone(),
            config.max_size_bytes(),
            config.default_ttl,
        )
    }

    // == Accessors ==
    /// Directory holding the store.
    pub fn cache_directory(&self) -> &Path {
        &self.cache_directory
    }

    /// Path of the SQLite file.
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Configured size ceiling in bytes.
    pub fn max_size_bytes(&self) -> u64 {
        self.max_size_bytes
    }

    /// TTL in seconds used when none is given.
    pub fn default_ttl(&self) -> i64 {
        self.default_ttl
    }

    fn connect(&self) -> Result<Connection> {
        open_connection(&self.db_path)
    }

    // == Get ==
    /// Retrieves and decodes the value stored under `key`.
    ///
    /// Returns `None` when the key is absent, expired or undecodable as `T`;
    /// expired and undecodable entries are deleted on the way. A hit bumps
    /// the entry's hit count before decoding.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.try_get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(key = %key_preview(key), error = %e, "Cache read failed, treating as miss");
                None
            }
        }
    }

    fn try_get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let conn = self.connect()?;
        let row: Option<(Vec<u8>, String)> = conn
            .query_row(
                "SELECT value, expires_at FROM cache_entries WHERE key = ?1",
                params![key],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let Some((blob, expires_at)) = row else {
            debug!(key = %key_preview(key), "Cache miss");
            return Ok(None);
        };

        match parse_timestamp(&expires_at) {
            Some(expires_at) if Utc::now() > expires_at => {
                debug!(key = %key_preview(key), "Cache entry expired, removing");
                delete_row(&conn, key)?;
                return Ok(None);
            }
            Some(_) => {}
            None => {
                warn!(key = %key_preview(key), "Cache entry has unreadable expiry, removing");
                delete_row(&conn, key)?;
                return Ok(None);
            }
        }

        conn.execute(
            "UPDATE cache_entries SET hit_count = hit_count + 1 WHERE key = ?1",
            params![key],
        )?;

        match serde_json::from_slice(&blob) {
            Ok(value) => {
                debug!(key = %key_preview(key), "Cache hit");
                Ok(Some(value))
            }
            Err(e) => {
                warn!(key = %key_preview(key), error = %e, "Cache entry is corrupt, removing");
                delete_row(&conn, key)?;
                Ok(None)
            }
        }
    }

    // == Set ==
    /// Stores `value` under `key`, replacing any previous entry.
    ///
    /// Evicts least-hit, then oldest, entries first so the total stays within
    /// `max_size_bytes`. The hit count restarts at 0. `ttl` is in seconds;
    /// zero or negative means the entry is gone on the next read.
    ///
    /// Returns `false` instead of failing when serialization or storage breaks.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl: Option<i64>) -> bool {
        match self.try_set(key, value, ttl) {
            Ok(()) => true,
            Err(e) => {
                warn!(key = %key_preview(key), error = %e, "Failed to store cache entry");
                false
            }
        }
    }

    fn try_set<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl: Option<i64>) -> Result<()> {
        let blob = serde_json::to_vec(value)?;
        let size_bytes = blob.len() as u64;

        let conn = self.connect()?;
        evict_if_needed(&conn, size_bytes, self.max_size_bytes)?;

        let created_at = Utc::now();
        let expires_at = expiry_from(created_at, ttl.unwrap_or(self.default_ttl));

        conn.execute(
            "INSERT OR REPLACE INTO cache_entries
             (key, value, created_at, expires_at, hit_count, size_bytes)
             VALUES (?1, ?2, ?3, ?4, 0, ?5)",
            params![
                key,
                blob,
                format_timestamp(created_at),
                format_timestamp(expires_at),
                size_bytes as i64
            ],
        )?;

        debug!(key = %key_preview(key), size_bytes, "Cached entry");
        Ok(())
    }

    // == Delete ==
    /// Removes the entry for `key`. Returns whether anything was removed.
    pub fn delete(&self, key: &str) -> bool {
        match self.connect().and_then(|conn| delete_row(&conn, key)) {
            Ok(existed) => existed,
            Err(e) => {
                warn!(key = %key_preview(key), error = %e, "Failed to delete cache entry");
                false
            }
        }
    }

    // == Clear ==
    /// Removes every entry and returns how many there were.
    pub fn clear(&self) -> Result<usize> {
        let conn = self.connect()?;
        let removed = conn.execute("DELETE FROM cache_entries", [])?;
        info!(removed, "Cleared response cache");
        Ok(removed)
    }

    // == Clear Expired ==
    /// Removes entries whose expiry is strictly before now.
    ///
    /// Nothing calls this automatically; it is the maintenance sweep.
    pub fn clear_expired(&self) -> Result<usize> {
        let conn = self.connect()?;
        let now = format_timestamp(Utc::now());
        let removed = conn.execute(
            "DELETE FROM cache_entries WHERE expires_at < ?1",
            params![now],
        )?;
        if removed > 0 {
            info!(removed, "Removed expired cache entries");
        }
        Ok(removed)
    }

    // == Convenience Wrappers ==
    /// Stores a model response under the key derived from
    /// `(model, prompt, params)` and returns that key.
    ///
    /// The key is returned even if storing failed; lookups then simply miss.
    pub fn cache_response<T, I, K, V>(
        &self,
        model: &str,
        prompt: &str,
        response: &T,
        ttl: Option<i64>,
        params: I,
    ) -> String
    where
        T: Serialize + ?Sized,
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Display,
    {
        self.try_cache_response(model, prompt, response, ttl, params).0
    }

    /// Like [`ResponseCache::cache_response`], but also reports whether the
    /// response was stored.
    pub fn try_cache_response<T, I, K, V>(
        &self,
        model: &str,
        prompt: &str,
        response: &T,
        ttl: Option<i64>,
        params: I,
    ) -> (String, bool)
    where
        T: Serialize + ?Sized,
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Display,
    {
        let key = derive_key(model, prompt, params);
        let stored = self.set(&key, response, ttl);
        (key, stored)
    }

    /// Looks up the response cached for `(model, prompt, params)`.
    ///
    /// `params` must match what was passed to [`ResponseCache::cache_response`].
    pub fn get_cached_response<T, I, K, V>(&self, model: &str, prompt: &str, params: I) -> Option<T>
    where
        T: DeserializeOwned,
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Display,
    {
        self.get(&derive_key(model, prompt, params))
    }

    // == Stats ==
    /// Computes usage statistics. Counts are not expiry-filtered except
    /// `expired_entries`.
    pub fn get_stats(&self) -> Result<CacheStats> {
        let conn = self.connect()?;

        let total_entries: i64 =
            conn.query_row("SELECT COUNT(*) FROM cache_entries", [], |row| row.get(0))?;
        let total_size_bytes = total_size(&conn)?;
        let expired_entries: i64 = conn.query_row(
            "SELECT COUNT(*) FROM cache_entries WHERE expires_at < ?1",
            params![format_timestamp(Utc::now())],
            |row| row.get(0),
        )?;

        let mut stmt = conn.prepare(
            "SELECT key, hit_count FROM cache_entries
             ORDER BY hit_count DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![TOP_ENTRIES_LIMIT as i64], |row| {
            let hits: i64 = row.get(1)?;
            Ok((row.get::<_, String>(0)?, hits.max(0) as u64))
        })?;
        let mut top = Vec::new();
        for row in rows {
            top.push(row?);
        }

        Ok(CacheStats::from_totals(
            total_entries.max(0) as u64,
            total_size_bytes,
            self.max_size_bytes,
            expired_entries.max(0) as u64,
            top,
        ))
    }

    /// Sum of stored payload sizes in bytes.
    pub fn total_size_bytes(&self) -> Result<u64> {
        total_size(&self.connect()?)
    }

    // == Inspection ==
    /// Metadata of one entry, expired or not. Does not count as a hit.
    pub fn entry_metadata(&self, key: &str) -> Result<Option<EntryMetadata>> {
        let conn = self.connect()?;
        let row = conn
            .query_row(
                "SELECT key, created_at, expires_at, hit_count, size_bytes
                 FROM cache_entries WHERE key = ?1",
                params![key],
                read_metadata_row,
            )
            .optional()?;
        row.map(RawMetadata::into_metadata).transpose()
    }

    /// Metadata of every stored entry, oldest first.
    ///
    /// Rows with unreadable timestamps are removed and left out, the same way
    /// `get` drops them.
    pub fn entries(&self) -> Result<Vec<EntryMetadata>> {
        let conn = self.connect()?;
        let raw_rows = {
            let mut stmt = conn.prepare(
                "SELECT key, created_at, expires_at, hit_count, size_bytes
                 FROM cache_entries ORDER BY created_at ASC",
            )?;
            let rows = stmt.query_map([], read_metadata_row)?;
            rows.collect::<rusqlite::Result<Vec<_>>>()?
        };

        let mut entries = Vec::with_capacity(raw_rows.len());
        for raw in raw_rows {
            let key = raw.key.clone();
            match raw.into_metadata() {
                Ok(meta) => entries.push(meta),
                Err(e) => {
                    warn!(key = %key_preview(&key), error = %e, "Cache entry has unreadable timestamps, removing");
                    if let Err(e) = delete_row(&conn, &key) {
                        warn!(key = %key_preview(&key), error = %e, "Failed to remove unreadable cache entry");
                    }
                }
            }
        }
        Ok(entries)
    }
}

fn delete_row(conn: &Connection, key: &str) -> Result<bool> {
    let removed = conn.execute("DELETE FROM cache_entries WHERE key = ?1", params![key])?;
    Ok(removed > 0)
}

/// Metadata row as stored, timestamps still encoded.
struct RawMetadata {
    key: String,
    created_at: String,
    expires_at: String,
    hit_count: i64,
    size_bytes: i64,
}

impl RawMetadata {
    fn into_metadata(self) -> Result<EntryMetadata> {
        let decode = |raw: &str| {
            parse_timestamp(raw).ok_or_else(|| {
                CacheError::Internal(format!("malformed timestamp {raw:?} for {}", key_preview(&self.key)))
            })
        };
        Ok(EntryMetadata {
            created_at: decode(&self.created_at)?,
            expires_at: decode(&self.expires_at)?,
            hit_count: self.hit_count.max(0) as u64,
            size_bytes: self.size_bytes.max(0) as u64,
            key: self.key,
        })
    }
}

fn read_metadata_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawMetadata> {
    Ok(RawMetadata {
        key: row.get(0)?,
        created_at: row.get(1)?,
        expires_at: row.get(2)?,
        hit_count: row.get(3)?,
        size_bytes: row.get(4)?,
    })
}
