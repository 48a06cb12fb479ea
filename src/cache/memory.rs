//! In-process cache backend.
//!
//! Same contract as the Supabase backend, kept in an `Arc<RwLock<HashMap>>`.
//! Used for local runs without a cache service and throughout the tests.
//!
//! # Example
//!
//! ```rust
//! # tokio_test::block_on(async {
//! use archmaster::cache::{MemoryCache, TopicCache};
//! use serde_json::json;
//!
//! let cache = MemoryCache::new();
//! cache.upsert("uber", &json!({ "id": "uber" })).await;
//! assert_eq!(cache.lookup("uber").await, Some(json!({ "id": "uber" })));
//! # });
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;

use super::{CacheRecord, TopicCache};

/// Memory-backed [`TopicCache`].
///
/// Clone is cheap: all clones share the same map.
#[derive(Clone, Default)]
pub struct MemoryCache {
    records: Arc<RwLock<HashMap<String, CacheRecord>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Full stored record, including its timestamp.
    pub async fn get_record(&self, topic_id: &str) -> Option<CacheRecord> {
        self.records.read().await.get(topic_id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl TopicCache for MemoryCache {
    async fn lookup(&self, topic_id: &str) -> Option<Value> {
        let map = self.records.read().await;
        let found = map.get(topic_id).map(|r| r.data.clone());
        debug!(topic_id, hit = found.is_some(), "memory cache lookup");
        found
    }

    async fn upsert(&self, topic_id: &str, document: &Value) {
        let record = CacheRecord::new(topic_id, document.clone());
        self.records
            .write()
            .await
            .insert(topic_id.to_string(), record);
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
