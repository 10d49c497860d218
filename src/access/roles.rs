//! Role accessor. Admin checks run on most privileged requests, hence the
//! longer TTL.

use std::sync::Arc;

use serde_json::json;
use tracing::info;

use crate::access::{read_through, Fetched};
use crate::cache::Cache;
use crate::error::StoreResult;
use crate::keys::{ttl, CacheKey};
use crate::models::{Record, Role, UserRole};
use crate::store::{decode, BackingStore};

#[derive(Clone)]
pub struct RoleAccessor {
    cache: Cache,
    store: Arc<dyn BackingStore>,
}

impl RoleAccessor {
    pub fn new(cache: Cache, store: Arc<dyn BackingStore>) -> Self {
        Self { cache, store }
    }

    pub async fn get(&self, user_id: &str) -> StoreResult<Option<Fetched<UserRole>>> {
        let store = &self.store;
        read_through(&self.cache, &CacheKey::user_role(user_id), ttl::USER_ROLE, || async move {
            store
                .get(UserRole::TABLE, user_id)
                .await?
                .map(|row| decode(UserRole::TABLE, row))
                .transpose()
        })
        .await
    }

    /// A user without a role row is not an admin.
    pub async fn is_admin(&self, user_id: &str) -> StoreResult<bool> {
        Ok(self
            .get(user_id)
            .await?
            .is_some_and(|fetched| fetched.data.is_admin()))
    }

    /// Creates or replaces the user's role and caches the stored row.
    pub async fn set_role(&self, user_id: &str, role: Role) -> StoreResult<UserRole> {
        let row = match self.store.get(UserRole::TABLE, user_id).await? {
            Some(_) => {
                self.store
                    .update(UserRole::TABLE, user_id, json!({ "role": role }))
                    .await?
            }
            None => {
                self.store
                    .insert(UserRole::TABLE, json!({ "user_id": user_id, "role": role }))
                    .await?
            }
        };
        let stored: UserRole = decode(UserRole::TABLE, row)?;

        info!("role of {} set to {:?}", user_id, stored.role);
        self.cache
            .set(&CacheKey::user_role(user_id), &stored, Some(ttl::USER_ROLE))
            .await;
        Ok(stored)
    }

    /// Drops one cached role, or all of them.
    pub async fn invalidate(&self, user_id: Option<&str>) {
        match user_id {
            Some(id) => self.cache.del(&CacheKey::user_role(id)).await,
            None => self.cache.del_pattern(CacheKey::user_role_pattern()).await,
        };
    }
}
