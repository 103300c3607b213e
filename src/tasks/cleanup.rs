//! Expiry Sweep Task
//!
//! Optional background task that periodically removes expired cache entries.
//! Reads already drop expired entries lazily; the sweep reclaims space held
//! by entries nobody reads anymore.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::ResponseCache;

/// Spawns a task that calls `clear_expired` every `cleanup_interval_secs`.
///
/// The sweep itself runs on the blocking pool. Returns a JoinHandle that is
/// aborted during graceful shutdown.
///
/// # Example
/// ```ignore
/// let cache = Arc::new(ResponseCache::new(".cache/ollama", 100 * 1024 * 1024, 3600)?);
/// let cleanup_handle = spawn_cleanup_task(cache.clone(), 60);
/// // Later, during shutdown:
/// cleanup_handle.abort();
/// ```
pub fn spawn_cleanup_task(cache: Arc<ResponseCache>, cleanup_interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(cleanup_interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting expiry sweep task with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            let cache = Arc::clone(&cache);
            match tokio::task::spawn_blocking(move || cache.clear_expired()).await {
                Ok(Ok(removed)) if removed > 0 => {
                    info!("Expiry sweep: removed {} expired entries", removed);
                }
                Ok(Ok(_)) => debug!("Expiry sweep: no expired entries found"),
                Ok(Err(e)) => warn!(error = %e, "Expiry sweep failed"),
                Err(e) => warn!(error = %e, "Expiry sweep task panicked"),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shared_cache() -> (tempfile::TempDir, Arc<ResponseCache>) {
        let dir = tempfile::tempdir().unwrap();
        let cache = ResponseCache::new(dir.path(), 1024 * 1024, 300).unwrap();
        (dir, Arc::new(cache))
    }

    #[tokio::test]
    async fn test_cleanup_task_removes_expired_entries() {
        let (_dir, cache) = shared_cache();
        cache.set("expire_soon", "value", Some(1));

        let handle = spawn_cleanup_task(cache.clone(), 1);

        // Entry expires after 1s; the sweep runs at ~1s and ~2s.
        tokio::time::sleep(Duration::from_millis(2500)).await;

        assert!(
            cache.entry_metadata("expire_soon").unwrap().is_none(),
            "Expired entry should have been swept"
        );

        handle.abort();
    }

    #[tokio::test]
    async fn test_cleanup_task_preserves_valid_entries() {
        let (_dir, cache) = shared_cache();
        cache.set("long_lived", "value", Some(3600));

        let handle = spawn_cleanup_task(cache.clone(), 1);
        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert_eq!(cache.get::<String>("long_lived").as_deref(), Some("value"));
        assert_eq!(cache.entry_metadata("long_lived").unwrap().unwrap().hit_count, 1);

        handle.abort();
    }

    #[tokio::test]
    async fn test_cleanup_task_can_be_aborted() {
        let (_dir, cache) = shared_cache();

        let handle = spawn_cleanup_task(cache, 1);
        handle.abort();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}
