//! Export Module
//!
//! Metadata export for offline inspection. Cached values never leave the store.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::cache::{CacheStats, EntryMetadata, ResponseCache};
use crate::error::Result;

// == Export Document ==
/// Exported document: statistics plus per-entry metadata, never payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheExport {
    pub stats: CacheStats,
    pub entries: Vec<EntryMetadata>,
}

// == Export Operations ==
impl ResponseCache {
    /// Builds the export document in memory.
    ///
    /// Entries are read first so unreadable rows dropped on the way are not
    /// counted in the stats.
    pub fn export(&self) -> Result<CacheExport> {
        let entries = self.entries()?;
        Ok(CacheExport {
            stats: self.get_stats()?,
            entries,
        })
    }

    /// Writes the export document as pretty-printed JSON to `path`.
    pub fn export_to_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let document = self.export()?;
        std::fs::write(path, serde_json::to_vec_pretty(&document)?)?;
        info!(
            path = %path.display(),
            entries = document.entries.len(),
            "Exported cache metadata"
        );
        Ok(())
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn test_export_to_json_has_stats_and_entries_without_values() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ResponseCache::new(dir.path().join("cache"), 1024 * 1024, 60).unwrap();
        assert!(cache.set("alpha", &json!({"test": true}), None));

        let output = dir.path().join("out.json");
        cache.export_to_json(&output).unwrap();

        let content: Value = serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        assert!(content.get("stats").is_some());
        let entries = content["entries"].as_array().unwrap();
        assert_eq!(entries.len(), 1);
        for entry in entries {
            assert!(entry.get("value").is_none());
            assert_eq!(entry["key"], "alpha");
            assert_eq!(entry["hit_count"], 0);
            assert!(entry.get("created_at").is_some());
            assert!(entry.get("expires_at").is_some());
            assert!(entry.get("size_bytes").is_some());
        }
        assert_eq!(content["stats"]["total_entries"], 1);
    }

    #[test]
    fn test_export_in_memory_matches_entries() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ResponseCache::new(dir.path(), 1024 * 1024, 60).unwrap();
        cache.set("a", "one", None);
        cache.set("b", "two", None);

        let export = cache.export().unwrap();
        assert_eq!(export.stats.total_entries, 2);
        let mut keys: Vec<_> = export.entries.iter().map(|e| e.key.as_str()).collect();
        keys.sort();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn test_export_to_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ResponseCache::new(dir.path(), 1024, 60).unwrap();
        let result = cache.export_to_json(dir.path().join("missing").join("out.json"));
        assert!(result.is_err());
    }
}
