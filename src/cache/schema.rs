//! Schema Module
//!
//! Store connection setup and the `cache_entries` table definition.

use std::path::Path;
use std::time::Duration;

use rusqlite::Connection;

use crate::error::Result;

// == Connection ==
/// How long a connection waits on a locked database before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens a connection to the store at `path`, creating the file if needed.
pub(crate) fn open_connection(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    Ok(conn)
}

// == Schema ==
/// Ensures the `cache_entries` table and its expiry index exist.
///
/// Safe to run on every startup.
pub(crate) fn ensure_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS cache_entries (
            key TEXT PRIMARY KEY,
            value BLOB NOT NULL,
            created_at TEXT NOT NULL,
            expires_at TEXT NOT NULL,
            hit_count INTEGER DEFAULT 0,
            size_bytes INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_expires_at
            ON cache_entries(expires_at);",
    )?;
    Ok(())
}
