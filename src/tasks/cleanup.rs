//! TTL cleanup task. Expired entries are also dropped lazily on access; this
//! sweep reclaims the ones nobody reads again.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::MemoryStore;

/// Sweeps expired entries every `interval_secs` until the handle is aborted.
pub fn spawn_cleanup_task(store: Arc<RwLock<MemoryStore>>, interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(interval_secs.max(1));

    tokio::spawn(async move {
        info!("TTL cleanup running every {}s", interval.as_secs());

        loop {
            tokio::time::sleep(interval).await;

            let removed = store.write().await.cleanup_expired();
            if removed > 0 {
                info!("TTL cleanup: removed {} expired entries", removed);
            } else {
                debug!("TTL cleanup: nothing expired");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shared_store() -> Arc<RwLock<MemoryStore>> {
        Arc::new(RwLock::new(MemoryStore::new(100)))
    }

    #[tokio::test]
    async fn test_cleanup_reclaims_expired_entries() {
        let store = shared_store();
        store
            .write()
            .await
            .set("session:old".to_string(), "{}".to_string(), Some(1))
            .unwrap();

        let handle = spawn_cleanup_task(Arc::clone(&store), 1);
        tokio::time::sleep(Duration::from_millis(2500)).await;

        // Removed by the sweep, not by a lazy read.
        let guard = store.read().await;
        assert_eq!(guard.len(), 0);
        assert!(guard.stats().expirations >= 1);
        drop(guard);

        handle.abort();
    }

    #[tokio::test]
    async fn test_cleanup_keeps_live_entries() {
        let store = shared_store();
        store
            .write()
            .await
            .set("profile:u1".to_string(), "{}".to_string(), Some(3600))
            .unwrap();

        let handle = spawn_cleanup_task(Arc::clone(&store), 1);
        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert_eq!(store.write().await.get("profile:u1").unwrap(), "{}");
        handle.abort();
    }

    #[tokio::test]
    async fn test_cleanup_task_can_be_aborted() {
        let handle = spawn_cleanup_task(shared_store(), 1);
        handle.abort();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished());
    }
}
