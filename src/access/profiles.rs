//! Profile accessor: single profiles and the (filtered) directory list.

use std::sync::Arc;

use tracing::debug;

use crate::access::{read_through, read_through_list, Fetched};
use crate::cache::Cache;
use crate::error::StoreResult;
use crate::keys::{ttl, CacheKey};
use crate::models::{Profile, ProfilePatch, Record};
use crate::store::{decode, decode_all, encode, BackingStore, Query};

/// Directory filter; its signature is part of the list's cache key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProfileFilter {
    /// None lists every profile regardless of moderation state
    pub approved: Option<bool>,
}

impl ProfileFilter {
    pub fn all() -> Self {
        Self::default()
    }

    /// Profiles visible in the public directory.
    pub fn approved() -> Self {
        Self {
            approved: Some(true),
        }
    }

    /// Profiles awaiting moderation.
    pub fn pending() -> Self {
        Self {
            approved: Some(false),
        }
    }

    pub fn signature(&self) -> Option<String> {
        self.approved.map(|approved| format!("is_approved={}", approved))
    }

    pub fn cache_key(&self) -> String {
        CacheKey::profiles(self.signature().as_deref())
    }

    fn query(&self) -> Query {
        let query = Query::new().order_by("created_at", true);
        match self.approved {
            Some(approved) => query.eq("is_approved", approved),
            None => query,
        }
    }
}

#[derive(Clone)]
pub struct ProfileAccessor {
    cache: Cache,
    store: Arc<dyn BackingStore>,
}

impl ProfileAccessor {
    pub fn new(cache: Cache, store: Arc<dyn BackingStore>) -> Self {
        Self { cache, store }
    }

    /// A single profile, None when the user has none.
    pub async fn get(&self, user_id: &str) -> StoreResult<Option<Fetched<Profile>>> {
        let store = &self.store;
        read_through(&self.cache, &CacheKey::profile(user_id), ttl::PROFILE, || async move {
            store
                .get(Profile::TABLE, user_id)
                .await?
                .map(|row| decode(Profile::TABLE, row))
                .transpose()
        })
        .await
    }

    /// Newest profiles first.
    pub async fn list(&self, filter: ProfileFilter) -> StoreResult<Fetched<Vec<Profile>>> {
        let store = &self.store;
        let query = filter.query();
        read_through_list(&self.cache, &filter.cache_key(), ttl::PROFILE_LIST, || async move {
            let rows = store.query(Profile::TABLE, &query).await?;
            decode_all(Profile::TABLE, rows)
        })
        .await
    }

    pub async fn create(&self, profile: &Profile) -> StoreResult<Profile> {
        let row = self.store.insert(Profile::TABLE, encode(profile)?).await?;
        let created: Profile = decode(Profile::TABLE, row)?;

        debug!("profile {} created", created.id);
        self.cache.del_pattern(CacheKey::profiles_pattern()).await;
        Ok(created)
    }

    /// Writes the patch and caches the returned record in place of the old
    /// one, so an immediate `get` sees the change without a store read.
    pub async fn update(&self, user_id: &str, patch: &ProfilePatch) -> StoreResult<Profile> {
        let row = self
            .store
            .update(Profile::TABLE, user_id, encode(patch)?)
            .await?;
        let updated: Profile = decode(Profile::TABLE, row)?;

        self.cache
            .set(&CacheKey::profile(user_id), &updated, Some(ttl::PROFILE))
            .await;
        self.cache.del_pattern(CacheKey::profiles_pattern()).await;
        Ok(updated)
    }

    /// Admin moderation: approve or revoke a profile.
    pub async fn set_approval(&self, user_id: &str, approved: bool) -> StoreResult<Profile> {
        let patch = ProfilePatch {
            is_approved: Some(approved),
            ..ProfilePatch::default()
        };
        self.update(user_id, &patch).await
    }

    pub async fn delete(&self, user_id: &str) -> StoreResult<()> {
        self.store.delete(Profile::TABLE, user_id).await?;

        self.cache.del(&CacheKey::profile(user_id)).await;
        self.cache.del_pattern(CacheKey::profiles_pattern()).await;
        Ok(())
    }

    /// Drops one cached profile (or all of them) and every cached list.
    pub async fn invalidate(&self, user_id: Option<&str>) {
        match user_id {
            Some(id) => self.cache.del(&CacheKey::profile(id)).await,
            None => self.cache.del_pattern(CacheKey::profile_pattern()).await,
        };
        self.cache.del_pattern(CacheKey::profiles_pattern()).await;
    }
}
