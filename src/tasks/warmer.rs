//! Cache warmer. Pre-populates the hot keys after login or startup by
//! running the ordinary read paths in the background.

use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, warn};

use crate::access::DataLayer;
use crate::error::StoreResult;

#[derive(Clone)]
pub struct CacheWarmer {
    data: DataLayer,
}

impl CacheWarmer {
    pub fn new(data: DataLayer) -> Self {
        Self { data }
    }

    /// Warms announcements and gallery, plus the user's profile and role when
    /// a user is given. Returns immediately; failures are logged and never
    /// reach the caller. Awaiting the handle is optional.
    pub fn warm_up(&self, user_id: Option<String>) -> JoinHandle<()> {
        let mut reads = JoinSet::new();

        let data = self.data.clone();
        reads.spawn(async move { ("announcements", outcome(data.announcements.list().await)) });
        let data = self.data.clone();
        reads.spawn(async move { ("gallery", outcome(data.gallery.list().await)) });

        if let Some(user_id) = user_id {
            let data = self.data.clone();
            let id = user_id.clone();
            reads.spawn(async move { ("profile", outcome(data.profiles.get(&id).await)) });
            let data = self.data.clone();
            reads.spawn(async move { ("role", outcome(data.roles.get(&user_id).await)) });
        }

        tokio::spawn(async move {
            while let Some(joined) = reads.join_next().await {
                match joined {
                    Ok((resource, Ok(()))) => debug!("warmed {}", resource),
                    Ok((resource, Err(e))) => warn!(resource, error = %e, "cache warm-up failed"),
                    Err(e) => warn!(error = %e, "cache warm-up task aborted"),
                }
            }
        })
    }
}

fn outcome<T>(result: StoreResult<T>) -> StoreResult<()> {
    result.map(|_| ())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::cache::Cache;
    use crate::keys::CacheKey;
    use crate::models::{Profile, Role};
    use crate::store::MemoryBackingStore;

    #[tokio::test]
    async fn test_warm_up_populates_hot_keys() {
        let cache = Cache::in_memory(100);
        let data = DataLayer::new(cache.clone(), Arc::new(MemoryBackingStore::new()));
        data.profiles
            .create(&Profile::new("u1", "Ada", "ada@example.com"))
            .await
            .unwrap();
        data.roles.set_role("u1", Role::Member).await.unwrap();
        data.roles.invalidate(Some("u1")).await;

        data.warmer().warm_up(Some("u1".to_string())).await.unwrap();

        assert!(cache.exists(CacheKey::announcements()).await);
        assert!(cache.exists(CacheKey::gallery()).await);
        assert!(cache.exists(&CacheKey::profile("u1")).await);
        assert!(cache.exists(&CacheKey::user_role("u1")).await);
    }

    #[tokio::test]
    async fn test_warm_up_without_user_skips_user_keys() {
        let cache = Cache::in_memory(100);
        let data = DataLayer::new(cache.clone(), Arc::new(MemoryBackingStore::new()));

        data.warmer().warm_up(None).await.unwrap();

        assert!(cache.exists(CacheKey::announcements()).await);
        assert!(cache.exists(CacheKey::gallery()).await);
        assert_eq!(data.profiles.get("u1").await.unwrap(), None);
    }
}
