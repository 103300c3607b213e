//! Cache Statistics Module
//!
//! Size, expiry and popularity figures computed from the store.

use serde::{Deserialize, Serialize};

use crate::cache::KEY_PREVIEW_LENGTH;
use crate::config::BYTES_PER_MB;

// == Top Entry ==
/// A frequently hit entry, identified by a truncated key only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopEntry {
    /// First characters of the key followed by `...`
    pub key: String,
    /// Hit count of the entry
    pub hits: u64,
}

// == Cache Stats ==
/// Snapshot of cache usage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Stored rows, including expired rows not yet swept
    pub total_entries: u64,
    /// Sum of payload sizes in megabytes
    pub total_size_mb: f64,
    /// Configured size limit in megabytes
    pub max_size_mb: f64,
    /// `total_size / max_size * 100`, 0 when the limit is 0
    pub usage_percent: f64,
    /// Rows whose expiry time has passed
    pub expired_entries: u64,
    /// Most hit entries, highest first
    pub top_entries: Vec<TopEntry>,
}

impl CacheStats {
    // == Constructor ==
    /// Builds statistics from raw byte totals and `(key, hits)` pairs.
    pub fn from_totals(
        total_entries: u64,
        total_size_bytes: u64,
        max_size_bytes: u64,
        expired_entries: u64,
        top: Vec<(String, u64)>,
    ) -> Self {
        Self {
            total_entries,
            total_size_mb: total_size_bytes as f64 / BYTES_PER_MB as f64,
            max_size_mb: max_size_bytes as f64 / BYTES_PER_MB as f64,
            usage_percent: usage_percent(total_size_bytes, max_size_bytes),
            expired_entries,
            top_entries: top
                .into_iter()
                .map(|(key, hits)| TopEntry {
                    key: key_preview(&key),
                    hits,
                })
                .collect(),
        }
    }
}

/// Percentage of `max_size_bytes` in use; 0 when `max_size_bytes` is 0.
pub fn usage_percent(total_size_bytes: u64, max_size_bytes: u64) -> f64 {
    if max_size_bytes == 0 {
        0.0
    } else {
        total_size_bytes as f64 / max_size_bytes as f64 * 100.0
    }
}

/// Truncated key shown in statistics.
pub fn key_preview(key: &str) -> String {
    let prefix: String = key.chars().take(KEY_PREVIEW_LENGTH).collect();
    format!("{prefix}...")
}
