//! Announcement accessor. Admin-authored, read as one list.

use std::sync::Arc;

use crate::access::{read_through_list, Fetched};
use crate::cache::Cache;
use crate::error::StoreResult;
use crate::keys::{ttl, CacheKey};
use crate::models::{Announcement, AnnouncementPatch, NewAnnouncement, Record};
use crate::store::{decode, decode_all, encode, BackingStore, Query};

#[derive(Clone)]
pub struct AnnouncementAccessor {
    cache: Cache,
    store: Arc<dyn BackingStore>,
}

impl AnnouncementAccessor {
    pub fn new(cache: Cache, store: Arc<dyn BackingStore>) -> Self {
        Self { cache, store }
    }

    /// All announcements, newest first.
    pub async fn list(&self) -> StoreResult<Fetched<Vec<Announcement>>> {
        let store = &self.store;
        read_through_list(
            &self.cache,
            CacheKey::announcements(),
            ttl::ANNOUNCEMENTS,
            || async move {
                let query = Query::new().order_by("created_at", true);
                let rows = store.query(Announcement::TABLE, &query).await?;
                decode_all(Announcement::TABLE, rows)
            },
        )
        .await
    }

    pub async fn create(&self, announcement: &NewAnnouncement) -> StoreResult<Announcement> {
        let row = self
            .store
            .insert(Announcement::TABLE, encode(announcement)?)
            .await?;
        let created = decode(Announcement::TABLE, row)?;
        self.invalidate().await;
        Ok(created)
    }

    pub async fn update(&self, id: &str, patch: &AnnouncementPatch) -> StoreResult<Announcement> {
        let row = self
            .store
            .update(Announcement::TABLE, id, encode(patch)?)
            .await?;
        let updated = decode(Announcement::TABLE, row)?;
        self.invalidate().await;
        Ok(updated)
    }

    pub async fn delete(&self, id: &str) -> StoreResult<()> {
        self.store.delete(Announcement::TABLE, id).await?;
        self.invalidate().await;
        Ok(())
    }

    pub async fn invalidate(&self) {
        self.cache.del(CacheKey::announcements()).await;
    }
}
