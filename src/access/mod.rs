//! Cache-Aside Accessors
//!
//! One accessor per resource kind. Reads check the cache, fall back to the
//! backing store on a miss and populate the cache with the resource's TTL.
//! Writes go to the store first; only after the store accepted them is the
//! cache refreshed or invalidated. Store errors propagate unchanged, cache
//! failures never surface.
//!
//! No ordering is guaranteed between concurrent writers to one id: the last
//! store write wins and the cache holds whichever response arrived last.

mod announcements;
mod audit;
mod chat;
mod gallery;
mod profiles;
mod roles;
mod sessions;

use std::future::Future;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::cache::Cache;
use crate::error::StoreResult;
use crate::ratelimit::RateLimiter;
use crate::store::BackingStore;
use crate::tasks::CacheWarmer;

pub use announcements::AnnouncementAccessor;
pub use audit::AuditAccessor;
pub use chat::{ChatAccessor, CHAT_HISTORY_LIMIT};
pub use gallery::GalleryAccessor;
pub use profiles::{ProfileAccessor, ProfileFilter};
pub use roles::RoleAccessor;
pub use sessions::SessionAccessor;

// == Provenance ==
/// Where a returned value was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    Cache,
    Store,
}

/// A value together with its provenance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fetched<T> {
    pub data: T,
    pub source: Provenance,
}

impl<T> Fetched<T> {
    pub fn cached(data: T) -> Self {
        Self {
            data,
            source: Provenance::Cache,
        }
    }

    pub fn stored(data: T) -> Self {
        Self {
            data,
            source: Provenance::Store,
        }
    }

    pub fn from_cache(&self) -> bool {
        self.source == Provenance::Cache
    }

    pub fn into_inner(self) -> T {
        self.data
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Fetched<U> {
        Fetched {
            data: f(self.data),
            source: self.source,
        }
    }
}

// == Read-Through ==
/// Single-entity read-through. Absent entities are not cached.
pub(crate) async fn read_through<T, F, Fut>(
    cache: &Cache,
    key: &str,
    ttl: u64,
    load: F,
) -> StoreResult<Option<Fetched<T>>>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = StoreResult<Option<T>>>,
{
    if let Some(data) = cache.get::<T>(key).await {
        debug!("cache hit {}", key);
        return Ok(Some(Fetched::cached(data)));
    }

    debug!("cache miss {}", key);
    let Some(data) = load().await? else {
        return Ok(None);
    };
    cache.set(key, &data, Some(ttl)).await;
    Ok(Some(Fetched::stored(data)))
}

/// List read-through; an empty list is cached like any other.
pub(crate) async fn read_through_list<T, F, Fut>(
    cache: &Cache,
    key: &str,
    ttl: u64,
    load: F,
) -> StoreResult<Fetched<Vec<T>>>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = StoreResult<Vec<T>>>,
{
    if let Some(data) = cache.get::<Vec<T>>(key).await {
        debug!("cache hit {}", key);
        return Ok(Fetched::cached(data));
    }

    debug!("cache miss {}", key);
    let data = load().await?;
    cache.set(key, &data, Some(ttl)).await;
    Ok(Fetched::stored(data))
}

// == Data Layer ==
/// Every accessor wired to one cache and one backing store.
#[derive(Clone)]
pub struct DataLayer {
    pub profiles: ProfileAccessor,
    pub announcements: AnnouncementAccessor,
    pub gallery: GalleryAccessor,
    pub roles: RoleAccessor,
    pub chat: ChatAccessor,
    pub audit: AuditAccessor,
    pub sessions: SessionAccessor,
    pub rate_limiter: RateLimiter,
    cache: Cache,
}

impl DataLayer {
    pub fn new(cache: Cache, store: Arc<dyn BackingStore>) -> Self {
        Self {
            profiles: ProfileAccessor::new(cache.clone(), Arc::clone(&store)),
            announcements: AnnouncementAccessor::new(cache.clone(), Arc::clone(&store)),
            gallery: GalleryAccessor::new(cache.clone(), Arc::clone(&store)),
            roles: RoleAccessor::new(cache.clone(), Arc::clone(&store)),
            chat: ChatAccessor::new(cache.clone(), Arc::clone(&store)),
            audit: AuditAccessor::new(cache.clone(), store),
            sessions: SessionAccessor::new(cache.clone()),
            rate_limiter: RateLimiter::new(cache.clone()),
            cache,
        }
    }

    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    /// Warmer over this layer's read paths.
    pub fn warmer(&self) -> CacheWarmer {
        CacheWarmer::new(self.clone())
    }
}
