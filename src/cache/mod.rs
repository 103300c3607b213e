//! Cache Module
//!
//! Persistent SQLite-backed response cache with TTL expiration and
//! hit-count weighted, size-bounded eviction.

mod entry;
mod eviction;
mod export;
mod key;
mod schema;
mod stats;
mod store;


// Re-export public types
pub use entry::{format_timestamp, parse_timestamp, EntryMetadata};
pub use eviction::{select_victims, space_needed, EvictionCandidate, EvictionOutcome};
pub use export::CacheExport;
pub use key::{derive_key, GenerationParams, NO_PARAMS};
pub use stats::{key_preview, usage_percent, CacheStats, TopEntry};
pub use store::ResponseCache;

// == Public Constants ==
/// File name of the embedded database inside the cache directory
pub const DB_FILE_NAME: &str = "cache.db";

/// Number of most-hit entries reported by statistics
pub const TOP_ENTRIES_LIMIT: usize = 5;

/// Number of key characters shown in statistics before truncation
pub const KEY_PREVIEW_LENGTH: usize = 16;
