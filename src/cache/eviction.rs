//! Eviction Module
//!
//! Size-bounded eviction ordered by hit count, then age.
//!
//! Candidates are read straight from stored metadata, so no separate
//! access-order structure has to be maintained alongside the table.

use rusqlite::{params, Connection};
use tracing::debug;

use crate::error::Result;

// == Eviction Candidate ==
/// A stored entry considered for eviction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvictionCandidate {
    /// Cache key
    pub key: String,
    /// Payload size in bytes
    pub size_bytes: u64,
}

// == Eviction Outcome ==
/// Result of one eviction pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvictionOutcome {
    /// Number of entries removed
    pub evicted: usize,
    /// Bytes released by the removed entries
    pub freed_bytes: u64,
}

/// Bytes that must be released so that `current_total + new_entry_size`
/// fits into `max_size_bytes`. Zero when it already fits.
pub fn space_needed(current_total: u64, new_entry_size: u64, max_size_bytes: u64) -> u64 {
    current_total
        .saturating_add(new_entry_size)
        .saturating_sub(max_size_bytes)
}

/// Picks victims from `candidates`, which must already be ordered
/// least-hit first and oldest first within equal hit counts.
///
/// Takes candidates in order until the freed size reaches `needed`, or all of
/// them if that never happens.
pub fn select_victims(candidates: &[EvictionCandidate], needed: u64) -> &[EvictionCandidate] {
    if needed == 0 {
        return &[];
    }

    let mut freed: u64 = 0;
    for (idx, candidate) in candidates.iter().enumerate() {
        freed = freed.saturating_add(candidate.size_bytes);
        if freed >= needed {
            return &candidates[..=idx];
        }
    }
    candidates
}

/// Total payload bytes currently stored, expired rows included.
pub(crate) fn total_size(conn: &Connection) -> Result<u64> {
    let total: i64 = conn.query_row(
        "SELECT COALESCE(SUM(size_bytes), 0) FROM cache_entries",
        [],
        |row| row.get(0),
    )?;
    Ok(total.max(0) as u64)
}

fn load_candidates(conn: &Connection) -> Result<Vec<EvictionCandidate>> {
    let mut stmt = conn.prepare(
        "SELECT key, size_bytes FROM cache_entries
         ORDER BY hit_count ASC, created_at ASC, rowid ASC",
    )?;
    let rows = stmt.query_map([], |row| {
        let size: i64 = row.get(1)?;
        Ok(EvictionCandidate {
            key: row.get(0)?,
            size_bytes: size.max(0) as u64,
        })
    })?;

    let mut candidates = Vec::new();
    for candidate in rows {
        candidates.push(candidate?);
    }
    Ok(candidates)
}

/// Makes room for an entry of `new_entry_size` bytes.
///
/// Victims are deleted one statement at a time. An entry larger than the whole
/// budget empties the cache and is still inserted by the caller.
pub(crate) fn evict_if_needed(
    conn: &Connection,
    new_entry_size: u64,
    max_size_bytes: u64,
) -> Result<EvictionOutcome> {
    let current = total_size(conn)?;
    let needed = space_needed(current, new_entry_size, max_size_bytes);
    if needed == 0 {
        return Ok(EvictionOutcome::default());
    }

    let candidates = load_candidates(conn)?;
    let mut outcome = EvictionOutcome::default();
    for victim in select_victims(&candidates, needed) {
        let removed = conn.execute(
            "DELETE FROM cache_entries WHERE key = ?1",
            params![victim.key],
        )?;
        // A concurrent writer may have removed it already.
        if removed > 0 {
            outcome.evicted += 1;
            outcome.freed_bytes += victim.size_bytes;
        }
    }

    debug!(
        evicted = outcome.evicted,
        freed_bytes = outcome.freed_bytes,
        needed,
        "Evicted cache entries to make room"
    );
    Ok(outcome)
}
