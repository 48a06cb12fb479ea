//! Topic document cache keyed by topic identifier.
//!
//! The cache treats documents as opaque JSON: it never re-validates their
//! shape. Backends swallow their own failures: a failed read is a miss and a
//! failed write is logged and forgotten.

pub mod memory;
pub mod supabase;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use memory::MemoryCache;
pub use supabase::SupabaseCache;

/// One stored row: topic key, opaque document and creation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheRecord {
    pub topic_id: String,
    pub data: Value,
    pub created_at: DateTime<Utc>,
}

impl CacheRecord {
    /// Stamp a new record with the current time.
    pub fn new(topic_id: &str, data: Value) -> Self {
        Self {
            topic_id: topic_id.to_string(),
            data,
            created_at: Utc::now(),
        }
    }
}

/// Point-lookup and upsert store for topic documents.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TopicCache: Send + Sync {
    /// Return the stored document, or `None` on miss or any backend error.
    async fn lookup(&self, topic_id: &str) -> Option<Value>;

    /// Insert or replace the document for `topic_id`. Never fails.
    async fn upsert(&self, topic_id: &str, document: &Value);

    /// Backend name for logging.
    fn name(&self) -> &'static str;
}

/// Whether a stored document should be served as a hit.
///
/// Falsy rows (`null`, `false`, `0`, `""`, `[]`, `{}`) count as misses so the
/// topic gets regenerated.
pub fn is_usable(document: &Value) -> bool {
    match document {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}
