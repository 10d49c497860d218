//! API Handlers
//!
//! HTTP handlers for the cache service. Each handler takes the store lock for
//! the duration of one operation.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::cache::{MemoryStore, ADMIN_TOKEN_HEADER};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{
    DeletePatternResponse, DeleteResponse, ExistsResponse, FlushResponse, GetResponse,
    HealthResponse, IncrRequest, IncrResponse, PatternRequest, SetRequest, SetResponse,
    StatsResponse, TtlResponse,
};

/// Shared state of the cache service.
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<RwLock<MemoryStore>>,
    /// Token required by POST /flush; None disables flushing
    pub admin_token: Option<String>,
}

impl AppState {
    pub fn new(store: MemoryStore, admin_token: Option<String>) -> Self {
        Self {
            cache: Arc::new(RwLock::new(store)),
            admin_token,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(MemoryStore::new(config.max_entries), config.admin_token.clone())
    }

    fn authorize_admin(&self, headers: &HeaderMap) -> Result<()> {
        let presented = headers
            .get(ADMIN_TOKEN_HEADER)
            .and_then(|value| value.to_str().ok());

        match (&self.admin_token, presented) {
            (Some(expected), Some(token)) if expected == token => Ok(()),
            (None, _) => Err(CacheError::Forbidden("flush is disabled".to_string())),
            _ => Err(CacheError::Forbidden("admin token required".to_string())),
        }
    }
}

/// PUT /set
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let mut cache = state.cache.write().await;
    cache.set(req.key.clone(), req.value, req.ttl)?;

    Ok(Json(SetResponse::new(req.key)))
}

/// GET /get/:key
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    // Write lock: reads touch the LRU order and the stats.
    let mut cache = state.cache.write().await;
    let value = cache.get(&key)?;

    Ok(Json(GetResponse::new(key, value)))
}

/// DELETE /del/:key. Deleting an absent key is not an error.
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Json<DeleteResponse> {
    let deleted = state.cache.write().await.delete(&key);
    Json(DeleteResponse { key, deleted })
}

/// POST /del-pattern
pub async fn delete_pattern_handler(
    State(state): State<AppState>,
    Json(req): Json<PatternRequest>,
) -> Result<Json<DeletePatternResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let deleted = state.cache.write().await.delete_pattern(&req.pattern);
    if deleted > 0 {
        info!("deleted {} keys matching '{}'", deleted, req.pattern);
    }

    Ok(Json(DeletePatternResponse {
        pattern: req.pattern,
        deleted,
    }))
}

/// GET /exists/:key
pub async fn exists_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Json<ExistsResponse> {
    let exists = state.cache.write().await.exists(&key);
    Json(ExistsResponse { key, exists })
}

/// POST /incr
pub async fn incr_handler(
    State(state): State<AppState>,
    Json(req): Json<IncrRequest>,
) -> Result<Json<IncrResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let value = state.cache.write().await.incr(&req.key, req.ttl)?;
    Ok(Json(IncrResponse {
        key: req.key,
        value,
    }))
}

/// GET /ttl/:key
pub async fn ttl_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Json<TtlResponse> {
    let ttl = state.cache.write().await.ttl(&key).as_seconds();
    Json(TtlResponse { key, ttl })
}

/// POST /flush, admin only.
pub async fn flush_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<FlushResponse>> {
    if let Err(e) = state.authorize_admin(&headers) {
        warn!("rejected flush: {}", e);
        return Err(e);
    }

    let flushed = state.cache.write().await.flush();
    info!("flushed {} entries", flushed);
    Ok(Json(FlushResponse { flushed }))
}

/// GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.cache.read().await.stats();
    Json(StatsResponse::from(stats))
}

/// GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
