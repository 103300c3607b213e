//! Cache Entry Module
//!
//! Value-free view of a stored entry plus the timestamp encoding used in the store.

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Largest TTL magnitude honoured, in seconds (roughly a century).
const MAX_TTL_SECS: i64 = 100 * 365 * 24 * 60 * 60;

// == Entry Metadata ==
/// Metadata of a single cache entry. Never carries the cached payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryMetadata {
    /// Cache key (normally a SHA-256 hex digest)
    pub key: String,
    /// Insertion time
    pub created_at: DateTime<Utc>,
    /// Time after which the entry is logically absent
    pub expires_at: DateTime<Utc>,
    /// Number of successful retrievals since the last `set`
    pub hit_count: u64,
    /// Size of the serialized payload in bytes
    pub size_bytes: u64,
}

impl EntryMetadata {
    // == Is Expired ==
    /// Checks whether the entry is expired at `now`.
    ///
    /// An entry is live up to and including `expires_at`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

// == Utility Functions ==
/// Computes the expiry time for an entry created at `created_at`.
///
/// Zero and negative TTLs yield an expiry at or before creation, so the entry
/// is gone on the next read.
pub fn expiry_from(created_at: DateTime<Utc>, ttl_secs: i64) -> DateTime<Utc> {
    let ttl = ttl_secs.clamp(-MAX_TTL_SECS, MAX_TTL_SECS);
    created_at + Duration::seconds(ttl)
}

/// Encodes a timestamp for storage.
///
/// Fixed-width RFC 3339 with microseconds and a `Z` suffix, so that string
/// comparison in SQL matches chronological order.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Decodes a stored timestamp. Returns `None` for malformed text.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}
