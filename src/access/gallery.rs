//! Gallery accessor.

use std::sync::Arc;

use crate::access::{read_through_list, Fetched};
use crate::cache::Cache;
use crate::error::StoreResult;
use crate::keys::{ttl, CacheKey};
use crate::models::{GalleryItem, NewGalleryItem, Record};
use crate::store::{decode, decode_all, encode, BackingStore, Query};

#[derive(Clone)]
pub struct GalleryAccessor {
    cache: Cache,
    store: Arc<dyn BackingStore>,
}

impl GalleryAccessor {
    pub fn new(cache: Cache, store: Arc<dyn BackingStore>) -> Self {
        Self { cache, store }
    }

    /// All gallery items, newest first.
    pub async fn list(&self) -> StoreResult<Fetched<Vec<GalleryItem>>> {
        let store = &self.store;
        read_through_list(&self.cache, CacheKey::gallery(), ttl::GALLERY, || async move {
            let query = Query::new().order_by("created_at", true);
            let rows = store.query(GalleryItem::TABLE, &query).await?;
            decode_all(GalleryItem::TABLE, rows)
        })
        .await
    }

    /// Records an already uploaded image.
    pub async fn create(&self, item: &NewGalleryItem) -> StoreResult<GalleryItem> {
        let row = self.store.insert(GalleryItem::TABLE, encode(item)?).await?;
        let created = decode(GalleryItem::TABLE, row)?;
        self.invalidate().await;
        Ok(created)
    }

    pub async fn delete(&self, id: &str) -> StoreResult<()> {
        self.store.delete(GalleryItem::TABLE, id).await?;
        self.invalidate().await;
        Ok(())
    }

    pub async fn invalidate(&self) {
        self.cache.del(CacheKey::gallery()).await;
    }
}
