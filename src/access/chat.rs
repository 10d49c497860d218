//! Chat accessor. Messages per room, the global room has no room id.

use std::sync::Arc;

use serde_json::Value;

use crate::access::{read_through_list, Fetched};
use crate::cache::Cache;
use crate::error::StoreResult;
use crate::keys::{ttl, CacheKey};
use crate::models::{ChatMessage, NewChatMessage, Record};
use crate::store::{decode, decode_all, encode, BackingStore, Query};

/// Messages returned per room.
pub const CHAT_HISTORY_LIMIT: usize = 100;

#[derive(Clone)]
pub struct ChatAccessor {
    cache: Cache,
    store: Arc<dyn BackingStore>,
}

impl ChatAccessor {
    pub fn new(cache: Cache, store: Arc<dyn BackingStore>) -> Self {
        Self { cache, store }
    }

    /// The latest messages of a room, oldest first.
    pub async fn list(&self, room_id: Option<&str>) -> StoreResult<Fetched<Vec<ChatMessage>>> {
        // An empty room id names the global room, for the key and the query alike
        let room_id = room_id.filter(|room| !room.is_empty());
        let store = &self.store;
        let key = CacheKey::chat_messages(room_id);
        read_through_list(&self.cache, &key, ttl::CHAT_MESSAGES, || async move {
            let room = room_id.map_or(Value::Null, |room| Value::String(room.to_string()));
            let query = Query::new()
                .eq("room_id", room)
                .order_by("created_at", true)
                .limit(CHAT_HISTORY_LIMIT);
            let rows = store.query(ChatMessage::TABLE, &query).await?;
            let mut messages: Vec<ChatMessage> = decode_all(ChatMessage::TABLE, rows)?;
            messages.reverse();
            Ok(messages)
        })
        .await
    }

    pub async fn send(&self, message: &NewChatMessage) -> StoreResult<ChatMessage> {
        let row = self.store.insert(ChatMessage::TABLE, encode(message)?).await?;
        let sent = decode(ChatMessage::TABLE, row)?;
        self.invalidate().await;
        Ok(sent)
    }

    pub async fn delete(&self, id: &str) -> StoreResult<()> {
        self.store.delete(ChatMessage::TABLE, id).await?;
        self.invalidate().await;
        Ok(())
    }

    /// Drops the cached history of every room.
    pub async fn invalidate(&self) {
        self.cache.del_pattern(CacheKey::chat_messages_pattern()).await;
    }
}
