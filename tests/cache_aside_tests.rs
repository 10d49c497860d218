//! Cache-aside behaviour of the accessors: read-through, write-then-read,
//! invalidation, TTL fallback and the failure policy.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use alumni_cache::access::{DataLayer, ProfileFilter, Provenance};
use alumni_cache::cache::{Cache, CacheClient, KeyTtl};
use alumni_cache::error::{CacheError, Result as CacheResult, StoreError, StoreResult};
use alumni_cache::keys::CacheKey;
use alumni_cache::models::{
    NewAnnouncement, NewAuditLog, NewChatMessage, NewGalleryItem, Profile, ProfilePatch, Role,
    SessionKind,
};
use alumni_cache::store::{BackingStore, MemoryBackingStore, Query, Table};
use async_trait::async_trait;
use serde_json::Value;

// == Test Doubles ==

/// Memory store that counts reads and can be switched offline.
#[derive(Default)]
struct CountingStore {
    inner: MemoryBackingStore,
    reads: AtomicUsize,
    offline: std::sync::atomic::AtomicBool,
}

impl CountingStore {
    fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    fn go_offline(&self) {
        self.offline.store(true, Ordering::SeqCst);
    }

    fn check(&self) -> StoreResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("store offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl BackingStore for CountingStore {
    fn name(&self) -> &'static str {
        "counting"
    }

    async fn get(&self, table: Table, id: &str) -> StoreResult<Option<Value>> {
        self.check()?;
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.get(table, id).await
    }

    async fn query(&self, table: Table, query: &Query) -> StoreResult<Vec<Value>> {
        self.check()?;
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.query(table, query).await
    }

    async fn insert(&self, table: Table, record: Value) -> StoreResult<Value> {
        self.check()?;
        self.inner.insert(table, record).await
    }

    async fn update(&self, table: Table, id: &str, patch: Value) -> StoreResult<Value> {
        self.check()?;
        self.inner.update(table, id, patch).await
    }

    async fn delete(&self, table: Table, id: &str) -> StoreResult<()> {
        self.check()?;
        self.inner.delete(table, id).await
    }
}

/// Cache transport that is always down.
struct DownCache;

fn down<T>() -> CacheResult<T> {
    Err(CacheError::Connection("connection refused".to_string()))
}

#[async_trait]
impl CacheClient for DownCache {
    fn backend_name(&self) -> &'static str {
        "down"
    }

    async fn get(&self, _key: &str) -> CacheResult<Option<String>> {
        down()
    }

    async fn set(&self, _key: &str, _value: String, _ttl: Option<u64>) -> CacheResult<()> {
        down()
    }

    async fn del(&self, _key: &str) -> CacheResult<bool> {
        down()
    }

    async fn del_pattern(&self, _pattern: &str) -> CacheResult<usize> {
        down()
    }

    async fn exists(&self, _key: &str) -> CacheResult<bool> {
        down()
    }

    async fn incr(&self, _key: &str, _ttl: Option<u64>) -> CacheResult<i64> {
        down()
    }

    async fn ttl(&self, _key: &str) -> CacheResult<KeyTtl> {
        down()
    }

    async fn flush(&self) -> CacheResult<usize> {
        down()
    }
}

// == Helper Functions ==

fn setup() -> (DataLayer, Cache, Arc<CountingStore>) {
    let cache = Cache::in_memory(1000);
    let store = Arc::new(CountingStore::default());
    let data = DataLayer::new(cache.clone(), store.clone());
    (data, cache, store)
}

async fn seed_profile(data: &DataLayer, id: &str, approved: bool) -> Profile {
    let mut profile = Profile::new(id, format!("User {}", id), format!("{}@example.com", id));
    profile.is_approved = approved;
    data.profiles.create(&profile).await.unwrap()
}

// == Read-Through ==

#[tokio::test]
async fn test_second_read_is_served_from_cache() {
    let (data, _cache, store) = setup();
    seed_profile(&data, "u1", true).await;

    let first = data.profiles.get("u1").await.unwrap().unwrap();
    assert_eq!(first.source, Provenance::Store);
    let second = data.profiles.get("u1").await.unwrap().unwrap();
    assert_eq!(second.source, Provenance::Cache);
    assert_eq!(first.data, second.data);

    assert_eq!(store.reads(), 1);
}

#[tokio::test]
async fn test_absent_profile_is_not_cached() {
    let (data, cache, store) = setup();

    assert!(data.profiles.get("ghost").await.unwrap().is_none());
    assert!(data.profiles.get("ghost").await.unwrap().is_none());

    assert!(!cache.exists(&CacheKey::profile("ghost")).await);
    assert_eq!(store.reads(), 2);
}

#[tokio::test]
async fn test_empty_list_is_cached() {
    let (data, cache, store) = setup();

    assert!(data.gallery.list().await.unwrap().data.is_empty());
    let again = data.gallery.list().await.unwrap();
    assert!(again.from_cache());
    assert!(cache.exists(CacheKey::gallery()).await);
    assert_eq!(store.reads(), 1);
}

// == Write Then Read ==

#[tokio::test]
async fn test_update_is_visible_to_the_next_read() {
    let (data, _cache, store) = setup();
    seed_profile(&data, "u1", false).await;
    data.profiles.get("u1").await.unwrap();

    let patch = ProfilePatch {
        company: Some("Acme".to_string()),
        ..ProfilePatch::default()
    };
    data.profiles.update("u1", &patch).await.unwrap();
    let reads_after_update = store.reads();

    let fetched = data.profiles.get("u1").await.unwrap().unwrap();
    assert_eq!(fetched.data.company.as_deref(), Some("Acme"));
    // Served from the refreshed entry, not the store
    assert!(fetched.from_cache());
    assert_eq!(store.reads(), reads_after_update);
}

#[tokio::test]
async fn test_approval_invalidates_every_filtered_list() {
    let (data, cache, _store) = setup();
    seed_profile(&data, "u1", false).await;

    let approved = data.profiles.list(ProfileFilter::approved()).await.unwrap();
    assert!(approved.data.is_empty());
    let pending = data.profiles.list(ProfileFilter::pending()).await.unwrap();
    assert_eq!(pending.data.len(), 1);
    data.profiles.list(ProfileFilter::all()).await.unwrap();

    data.profiles.set_approval("u1", true).await.unwrap();

    for filter in [ProfileFilter::all(), ProfileFilter::approved(), ProfileFilter::pending()] {
        assert!(!cache.exists(&filter.cache_key()).await);
    }
    let approved = data.profiles.list(ProfileFilter::approved()).await.unwrap();
    assert_eq!(approved.source, Provenance::Store);
    assert_eq!(approved.data.len(), 1);
}

#[tokio::test]
async fn test_delete_profile_drops_entity_and_lists() {
    let (data, cache, _store) = setup();
    seed_profile(&data, "u1", true).await;
    data.profiles.get("u1").await.unwrap();
    data.profiles.list(ProfileFilter::all()).await.unwrap();

    data.profiles.delete("u1").await.unwrap();

    assert!(!cache.exists(&CacheKey::profile("u1")).await);
    assert!(!cache.exists(&ProfileFilter::all().cache_key()).await);
    assert!(data.profiles.get("u1").await.unwrap().is_none());
}

#[tokio::test]
async fn test_announcements_newest_first_and_refreshed_on_write() {
    let (data, _cache, _store) = setup();
    let announcement = |title: &str| NewAnnouncement {
        title: title.to_string(),
        content: "body".to_string(),
        author_id: "admin".to_string(),
    };

    data.announcements.create(&announcement("first")).await.unwrap();
    tokio::time::sleep(Duration::from_millis(5)).await;
    let second = data.announcements.create(&announcement("second")).await.unwrap();

    let listed = data.announcements.list().await.unwrap();
    let titles: Vec<_> = listed.data.iter().map(|a| a.title.as_str()).collect();
    assert_eq!(titles, ["second", "first"]);

    data.announcements.delete(&second.id).await.unwrap();
    let listed = data.announcements.list().await.unwrap();
    assert_eq!(listed.source, Provenance::Store);
    assert_eq!(listed.data.len(), 1);
}

#[tokio::test]
async fn test_gallery_create_invalidates_list() {
    let (data, _cache, _store) = setup();
    data.gallery.list().await.unwrap();

    data.gallery
        .create(&NewGalleryItem {
            title: "Reunion".to_string(),
            image_url: "https://cdn.example.com/reunion.jpg".to_string(),
            description: None,
            uploaded_by: "u1".to_string(),
        })
        .await
        .unwrap();

    let listed = data.gallery.list().await.unwrap();
    assert!(!listed.from_cache());
    assert_eq!(listed.data.len(), 1);
}

#[tokio::test]
async fn test_chat_history_is_oldest_first_per_room() {
    let (data, cache, _store) = setup();
    let message = |room: Option<&str>, content: &str| NewChatMessage {
        room_id: room.map(str::to_string),
        sender_id: "u1".to_string(),
        sender_name: Some("Ada".to_string()),
        content: content.to_string(),
    };

    data.chat.send(&message(None, "hello")).await.unwrap();
    tokio::time::sleep(Duration::from_millis(5)).await;
    data.chat.send(&message(None, "again")).await.unwrap();
    data.chat.send(&message(Some("class-2010"), "reunion?")).await.unwrap();

    let global = data.chat.list(None).await.unwrap();
    let contents: Vec<_> = global.data.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, ["hello", "again"]);

    let room = data.chat.list(Some("class-2010")).await.unwrap();
    assert_eq!(room.data.len(), 1);

    // One send drops the history of every room
    data.chat.send(&message(Some("class-2010"), "yes")).await.unwrap();
    assert!(!cache.exists(&CacheKey::chat_messages(None)).await);
    assert!(!cache.exists(&CacheKey::chat_messages(Some("class-2010"))).await);
}

#[tokio::test]
async fn test_empty_room_id_reads_the_global_room() {
    let (data, _cache, _store) = setup();
    data.chat
        .send(&NewChatMessage {
            room_id: None,
            sender_id: "u1".to_string(),
            sender_name: None,
            content: "hello".to_string(),
        })
        .await
        .unwrap();

    let empty_room = data.chat.list(Some("")).await.unwrap();
    assert_eq!(empty_room.data.len(), 1);

    let global = data.chat.list(None).await.unwrap();
    assert!(global.from_cache());
    assert_eq!(global.data.len(), 1);
    assert_eq!(global.data[0].content, "hello");
}

#[tokio::test]
async fn test_role_upsert_and_admin_check() {
    let (data, _cache, store) = setup();

    assert!(!data.roles.is_admin("u1").await.unwrap());

    data.roles.set_role("u1", Role::Member).await.unwrap();
    assert!(!data.roles.is_admin("u1").await.unwrap());

    data.roles.set_role("u1", Role::Admin).await.unwrap();
    let reads = store.reads();
    assert!(data.roles.is_admin("u1").await.unwrap());
    assert_eq!(store.reads(), reads);
}

#[tokio::test]
async fn test_audit_record_invalidates_log() {
    let (data, _cache, _store) = setup();
    assert!(data.audit.list().await.unwrap().data.is_empty());

    data.audit
        .record(&NewAuditLog {
            actor_id: "admin".to_string(),
            action: "approve_profile".to_string(),
            target_type: "profile".to_string(),
            target_id: Some("u1".to_string()),
            details: None,
        })
        .await
        .unwrap();

    let logs = data.audit.list().await.unwrap();
    assert_eq!(logs.source, Provenance::Store);
    assert_eq!(logs.data[0].action, "approve_profile");
}

// == TTL ==

#[tokio::test]
async fn test_expired_entry_falls_back_to_store() {
    let (data, cache, store) = setup();
    let profile = seed_profile(&data, "u1", true).await;
    cache.set(&CacheKey::profile("u1"), &profile, Some(1)).await;

    assert!(data.profiles.get("u1").await.unwrap().unwrap().from_cache());
    tokio::time::sleep(Duration::from_millis(1100)).await;

    let fetched = data.profiles.get("u1").await.unwrap().unwrap();
    assert_eq!(fetched.source, Provenance::Store);
    assert_eq!(store.reads(), 1);
}

#[tokio::test]
async fn test_entries_carry_resource_ttls() {
    let (data, cache, _store) = setup();
    seed_profile(&data, "u1", true).await;
    data.profiles.get("u1").await.unwrap();
    data.announcements.list().await.unwrap();

    assert!(matches!(
        cache.ttl(&CacheKey::profile("u1")).await,
        KeyTtl::Expires(secs) if secs <= 300 && secs > 290
    ));
    assert!(matches!(
        cache.ttl(CacheKey::announcements()).await,
        KeyTtl::Expires(secs) if secs <= 120 && secs > 110
    ));
}

// == Failure Policy ==

#[tokio::test]
async fn test_cache_outage_degrades_to_store() {
    let store = Arc::new(CountingStore::default());
    let data = DataLayer::new(Cache::new(Arc::new(DownCache)), store.clone());

    seed_profile(&data, "u1", true).await;
    let fetched = data.profiles.get("u1").await.unwrap().unwrap();
    assert_eq!(fetched.source, Provenance::Store);
    data.profiles.get("u1").await.unwrap();
    assert_eq!(store.reads(), 2);

    // Writes still reach the store
    let patch = ProfilePatch {
        bio: Some("Class of 2010".to_string()),
        ..ProfilePatch::default()
    };
    let updated = data.profiles.update("u1", &patch).await.unwrap();
    assert_eq!(updated.bio.as_deref(), Some("Class of 2010"));

    // Rate limiting fails open
    let decision = data.rate_limiter.check("u1", "post", 5, 60).await;
    assert!(decision.allowed);
    assert_eq!(decision.remaining, 5);

    // Sessions cannot be opened without a cache
    assert!(data.sessions.create("u1", SessionKind::Auth).await.is_none());
}

#[tokio::test]
async fn test_store_errors_propagate_and_leave_cache_untouched() {
    let (data, cache, store) = setup();
    store.go_offline();

    let result = data.profiles.get("u1").await;
    assert!(matches!(result, Err(StoreError::Unavailable(_))));

    let result = data.profiles.update("u1", &ProfilePatch::default()).await;
    assert!(matches!(result, Err(StoreError::Unavailable(_))));
    assert!(!cache.exists(&CacheKey::profile("u1")).await);
}

#[tokio::test]
async fn test_update_of_missing_record_is_not_found() {
    let (data, _cache, _store) = setup();
    let result = data.profiles.update("ghost", &ProfilePatch::default()).await;
    assert!(matches!(result, Err(StoreError::NotFound { .. })));
}

#[tokio::test]
async fn test_malformed_cache_entry_counts_as_miss() {
    let (data, cache, store) = setup();
    seed_profile(&data, "u1", true).await;
    cache.set(&CacheKey::profile("u1"), "not a profile", None).await;

    let fetched = data.profiles.get("u1").await.unwrap().unwrap();
    assert_eq!(fetched.source, Provenance::Store);
    assert_eq!(store.reads(), 1);
    // Repopulated with the valid record
    assert!(data.profiles.get("u1").await.unwrap().unwrap().from_cache());
}

// == Sessions / Warmer ==

#[tokio::test]
async fn test_sessions_live_only_in_cache() {
    let (data, cache, store) = setup();

    let session = data.sessions.create("u1", SessionKind::Standard).await.unwrap();
    assert!(cache.exists(&CacheKey::session(&session.session_id)).await);
    assert_eq!(data.sessions.get(&session.session_id).await, Some(session.clone()));
    assert_eq!(store.reads(), 0);

    assert!(data.sessions.destroy(&session.session_id).await);
    assert!(data.sessions.get(&session.session_id).await.is_none());
}

#[tokio::test]
async fn test_warmer_makes_first_reads_hits() {
    let (data, _cache, store) = setup();
    seed_profile(&data, "u1", true).await;

    data.warmer().warm_up(Some("u1".to_string())).await.unwrap();
    let reads = store.reads();

    assert!(data.profiles.get("u1").await.unwrap().unwrap().from_cache());
    assert!(data.announcements.list().await.unwrap().from_cache());
    assert!(data.gallery.list().await.unwrap().from_cache());
    assert_eq!(store.reads(), reads);
}

#[tokio::test]
async fn test_warmer_survives_store_outage() {
    let (data, cache, store) = setup();
    store.go_offline();

    data.warmer().warm_up(Some("u1".to_string())).await.unwrap();
    assert!(!cache.exists(CacheKey::announcements()).await);
}
