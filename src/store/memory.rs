//! In-process backing store adapter.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::store::{BackingStore, Query, Table};

/// Tables held in memory, rows kept in insertion order.
#[derive(Debug, Default)]
pub struct MemoryBackingStore {
    tables: RwLock<HashMap<Table, Vec<Value>>>,
}

impl MemoryBackingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows currently in a table.
    pub async fn count(&self, table: Table) -> usize {
        self.tables.read().await.get(&table).map_or(0, Vec::len)
    }
}

fn timestamp() -> Value {
    Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true))
}

fn row_id<'a>(table: Table, row: &'a Value) -> Option<&'a str> {
    row.get(table.primary_key()).and_then(Value::as_str)
}

fn not_found(table: Table, id: &str) -> StoreError {
    StoreError::NotFound {
        table: table.name().to_string(),
        id: id.to_string(),
    }
}

#[async_trait]
impl BackingStore for MemoryBackingStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, table: Table, id: &str) -> StoreResult<Option<Value>> {
        let tables = self.tables.read().await;
        Ok(tables
            .get(&table)
            .and_then(|rows| rows.iter().find(|row| row_id(table, row) == Some(id)))
            .cloned())
    }

    async fn query(&self, table: Table, query: &Query) -> StoreResult<Vec<Value>> {
        let rows = self
            .tables
            .read()
            .await
            .get(&table)
            .cloned()
            .unwrap_or_default();
        Ok(query.apply(rows))
    }

    async fn insert(&self, table: Table, mut record: Value) -> StoreResult<Value> {
        let pk = table.primary_key();
        let fields = record
            .as_object_mut()
            .ok_or_else(|| StoreError::Validation(format!("{} record must be an object", table)))?;

        let has_id = matches!(fields.get(pk), Some(Value::String(id)) if !id.is_empty());
        if !has_id {
            let absent = fields.get(pk).map_or(true, Value::is_null);
            // Only generated ids are assigned; user-keyed tables must carry theirs
            if !(absent && pk == "id") {
                return Err(StoreError::Validation(format!(
                    "{} record requires a non-empty string '{}'",
                    table, pk
                )));
            }
            fields.insert(pk.to_string(), Value::String(Uuid::new_v4().to_string()));
        }
        if fields.get("created_at").map_or(true, Value::is_null) {
            fields.insert("created_at".to_string(), timestamp());
        }

        let mut tables = self.tables.write().await;
        let rows = tables.entry(table).or_default();
        let id = row_id(table, &record).unwrap_or_default().to_string();
        if rows.iter().any(|row| row_id(table, row) == Some(id.as_str())) {
            return Err(StoreError::Constraint(format!(
                "duplicate {} '{}' in {}",
                pk, id, table
            )));
        }

        debug!("{}: inserted {} '{}'", self.name(), table, id);
        rows.push(record.clone());
        Ok(record)
    }

    async fn update(&self, table: Table, id: &str, patch: Value) -> StoreResult<Value> {
        let Value::Object(patch) = patch else {
            return Err(StoreError::Validation(format!("{} patch must be an object", table)));
        };
        let pk = table.primary_key();
        if patch.get(pk).is_some_and(|v| v.as_str() != Some(id)) {
            return Err(StoreError::Validation(format!("cannot change '{}'", pk)));
        }

        let mut tables = self.tables.write().await;
        let row = tables
            .get_mut(&table)
            .and_then(|rows| rows.iter_mut().find(|row| row_id(table, row) == Some(id)))
            .ok_or_else(|| not_found(table, id))?;

        if let Value::Object(fields) = row {
            fields.extend(patch);
            fields.insert("updated_at".to_string(), timestamp());
        }
        Ok(row.clone())
    }

    async fn delete(&self, table: Table, id: &str) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        let rows = tables.get_mut(&table).ok_or_else(|| not_found(table, id))?;
        let before = rows.len();
        rows.retain(|row| row_id(table, row) != Some(id));
        if rows.len() == before {
            return Err(not_found(table, id));
        }
        Ok(())
    }
}
