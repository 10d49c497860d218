//! Backing Store Module
//!
//! The authoritative persistence contract consumed by the accessors. Every
//! concrete store is one small adapter implementing [`BackingStore`]; records
//! travel as JSON objects.

mod memory;

use std::cmp::Ordering;
use std::fmt;

use async_trait::async_trait;
use chrono::DateTime;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{StoreError, StoreResult};

pub use memory::MemoryBackingStore;

// == Tables ==
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Profiles,
    Announcements,
    Gallery,
    ChatMessages,
    AuditLogs,
    UserRoles,
}

impl Table {
    pub fn name(&self) -> &'static str {
        match self {
            Table::Profiles => "profiles",
            Table::Announcements => "announcements",
            Table::Gallery => "gallery",
            Table::ChatMessages => "chat_messages",
            Table::AuditLogs => "audit_logs",
            Table::UserRoles => "user_roles",
        }
    }

    /// Field holding the row's identity.
    pub fn primary_key(&self) -> &'static str {
        match self {
            Table::UserRoles => "user_id",
            _ => "id",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// == Query ==
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub field: String,
    pub descending: bool,
}

/// Equality filters, optional ordering and limit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filters: Vec<(String, Value)>,
    pub order: Option<Order>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push((field.into(), value.into()));
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, descending: bool) -> Self {
        self.order = Some(Order {
            field: field.into(),
            descending,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// True when every filter field equals the filter value. A missing field
    /// only matches a `null` filter.
    pub fn matches(&self, record: &Value) -> bool {
        self.filters
            .iter()
            .all(|(field, expected)| record.get(field).unwrap_or(&Value::Null) == expected)
    }

    /// Filters, orders and truncates rows in place.
    pub fn apply(&self, rows: Vec<Value>) -> Vec<Value> {
        let mut rows: Vec<Value> = rows.into_iter().filter(|row| self.matches(row)).collect();

        if let Some(order) = &self.order {
            rows.sort_by(|a, b| {
                let ord = compare_fields(a.get(&order.field), b.get(&order.field));
                if order.descending {
                    ord.reverse()
                } else {
                    ord
                }
            });
        }

        if let Some(limit) = self.limit {
            rows.truncate(limit);
        }
        rows
    }
}

/// Orders JSON values; RFC 3339 strings compare chronologically, missing and
/// null values sort first.
fn compare_fields(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::String(a)), Some(Value::String(b))) => {
            match (DateTime::parse_from_rfc3339(a), DateTime::parse_from_rfc3339(b)) {
                (Ok(a), Ok(b)) => a.cmp(&b),
                _ => a.cmp(b),
            }
        }
        (Some(Value::Number(a)), Some(Value::Number(b))) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::Bool(a)), Some(Value::Bool(b))) => a.cmp(b),
        (None | Some(Value::Null), None | Some(Value::Null)) => Ordering::Equal,
        (None | Some(Value::Null), _) => Ordering::Less,
        (_, None | Some(Value::Null)) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

// == Backing Store Trait ==
/// Authoritative store for resource records.
#[async_trait]
pub trait BackingStore: Send + Sync {
    /// Adapter name for logging.
    fn name(&self) -> &'static str;

    async fn get(&self, table: Table, id: &str) -> StoreResult<Option<Value>>;

    async fn query(&self, table: Table, query: &Query) -> StoreResult<Vec<Value>>;

    /// Inserts a record and returns it as stored (generated fields included).
    async fn insert(&self, table: Table, record: Value) -> StoreResult<Value>;

    /// Applies a shallow patch and returns the full updated record.
    async fn update(&self, table: Table, id: &str, patch: Value) -> StoreResult<Value>;

    async fn delete(&self, table: Table, id: &str) -> StoreResult<()>;
}

// == Typed Conversion ==
pub(crate) fn decode<T: DeserializeOwned>(table: Table, row: Value) -> StoreResult<T> {
    serde_json::from_value(row).map_err(|e| StoreError::Malformed(format!("{}: {}", table, e)))
}

pub(crate) fn decode_all<T: DeserializeOwned>(table: Table, rows: Vec<Value>) -> StoreResult<Vec<T>> {
    rows.into_iter().map(|row| decode(table, row)).collect()
}

pub(crate) fn encode<T: Serialize>(value: &T) -> StoreResult<Value> {
    serde_json::to_value(value).map_err(|e| StoreError::Validation(e.to_string()))
}
