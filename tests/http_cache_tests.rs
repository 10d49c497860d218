//! The remote transport against a live cache service on a loopback port.

use std::sync::Arc;

use alumni_cache::cache::{Cache, CacheClient, HttpCache, KeyTtl, MemoryStore, ReconnectPolicy};
use alumni_cache::error::CacheError;
use alumni_cache::{create_router, AppState};
use serde_json::json;

const TOKEN: &str = "integration-token";

async fn spawn_service(admin_token: Option<&str>) -> String {
    let state = AppState::new(MemoryStore::new(100), admin_token.map(str::to_string));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, create_router(state)).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn connect(admin_token: Option<&str>) -> HttpCache {
    let url = spawn_service(Some(TOKEN)).await;
    HttpCache::connect(&url, ReconnectPolicy::default(), admin_token.map(str::to_string))
        .await
        .unwrap()
}

#[tokio::test]
async fn test_get_set_del_roundtrip() {
    let cache = connect(None).await;

    assert_eq!(cache.get("profile:u1").await.unwrap(), None);
    cache
        .set("profile:u1", "{\"id\":\"u1\"}".to_string(), Some(300))
        .await
        .unwrap();
    assert_eq!(
        cache.get("profile:u1").await.unwrap().as_deref(),
        Some("{\"id\":\"u1\"}")
    );
    assert!(cache.exists("profile:u1").await.unwrap());

    assert!(cache.del("profile:u1").await.unwrap());
    assert!(!cache.del("profile:u1").await.unwrap());
    assert_eq!(cache.get("profile:u1").await.unwrap(), None);
}

#[tokio::test]
async fn test_del_pattern_and_ttl() {
    let cache = connect(None).await;
    cache.set("chat:messages", "[]".to_string(), Some(60)).await.unwrap();
    cache.set("chat:messages:alumni", "[]".to_string(), None).await.unwrap();
    cache.set("gallery:all", "[]".to_string(), None).await.unwrap();

    assert!(matches!(cache.ttl("chat:messages").await.unwrap(), KeyTtl::Expires(s) if s <= 60));
    assert_eq!(cache.ttl("gallery:all").await.unwrap(), KeyTtl::Persistent);
    assert_eq!(cache.ttl("nothing").await.unwrap(), KeyTtl::Missing);

    assert_eq!(cache.del_pattern("chat:messages*").await.unwrap(), 2);
    assert!(cache.exists("gallery:all").await.unwrap());
}

#[tokio::test]
async fn test_incr_over_http() {
    let cache = connect(None).await;

    assert_eq!(cache.incr("ratelimit:u1:login", Some(60)).await.unwrap(), 1);
    assert_eq!(cache.incr("ratelimit:u1:login", Some(60)).await.unwrap(), 2);

    cache.set("profile:u1", "{}".to_string(), None).await.unwrap();
    let result = cache.incr("profile:u1", None).await;
    assert!(matches!(result, Err(CacheError::NotAnInteger(_))));
}

#[tokio::test]
async fn test_flush_uses_admin_token() {
    let without = connect(None).await;
    without.set("audit:logs", "[]".to_string(), None).await.unwrap();
    assert!(matches!(without.flush().await, Err(CacheError::Forbidden(_))));

    let with = connect(Some(TOKEN)).await;
    with.set("audit:logs", "[]".to_string(), None).await.unwrap();
    assert_eq!(with.flush().await.unwrap(), 1);
}

#[tokio::test]
async fn test_facade_over_remote_transport() {
    let remote = connect(None).await;
    let cache = Cache::new(Arc::new(remote));
    assert_eq!(cache.backend_name(), "http");

    let value = json!({"id": "u1", "full_name": "Ada"});
    assert!(cache.set("profile:u1", &value, Some(300)).await);
    assert_eq!(cache.get::<serde_json::Value>("profile:u1").await, Some(value));
    assert!(cache.del_pattern("profile:*").await);
    assert!(!cache.exists("profile:u1").await);
}
