//! Audit log accessor. Append-only.

use std::sync::Arc;

use crate::access::{read_through_list, Fetched};
use crate::cache::Cache;
use crate::error::StoreResult;
use crate::keys::{ttl, CacheKey};
use crate::models::{AuditLog, NewAuditLog, Record};
use crate::store::{decode, decode_all, encode, BackingStore, Query};

/// Entries returned by `list`.
const AUDIT_LOG_LIMIT: usize = 200;

#[derive(Clone)]
pub struct AuditAccessor {
    cache: Cache,
    store: Arc<dyn BackingStore>,
}

impl AuditAccessor {
    pub fn new(cache: Cache, store: Arc<dyn BackingStore>) -> Self {
        Self { cache, store }
    }

    /// Most recent entries first.
    pub async fn list(&self) -> StoreResult<Fetched<Vec<AuditLog>>> {
        let store = &self.store;
        read_through_list(&self.cache, CacheKey::audit_logs(), ttl::AUDIT_LOGS, || async move {
            let query = Query::new()
                .order_by("created_at", true)
                .limit(AUDIT_LOG_LIMIT);
            let rows = store.query(AuditLog::TABLE, &query).await?;
            decode_all(AuditLog::TABLE, rows)
        })
        .await
    }

    pub async fn record(&self, entry: &NewAuditLog) -> StoreResult<AuditLog> {
        let row = self.store.insert(AuditLog::TABLE, encode(entry)?).await?;
        let recorded = decode(AuditLog::TABLE, row)?;
        self.invalidate().await;
        Ok(recorded)
    }

    pub async fn invalidate(&self) {
        self.cache.del(CacheKey::audit_logs()).await;
    }
}
