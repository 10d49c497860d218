//! API Routes

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    delete_handler, delete_pattern_handler, exists_handler, flush_handler, get_handler,
    health_handler, incr_handler, set_handler, stats_handler, ttl_handler, AppState,
};

/// Router over every cache service endpoint, with permissive CORS and
/// request tracing.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/set", put(set_handler))
        .route("/get/:key", get(get_handler))
        .route("/del/:key", delete(delete_handler))
        .route("/del-pattern", post(delete_pattern_handler))
        .route("/exists/:key", get(exists_handler))
        .route("/incr", post(incr_handler))
        .route("/ttl/:key", get(ttl_handler))
        .route("/flush", post(flush_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
