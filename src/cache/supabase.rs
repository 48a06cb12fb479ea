//! Supabase (PostgREST) cache backend.
//!
//! Rows live in the `topic_cache` table with columns `topic_id`, `data` and
//! `created_at`. The table schema is owned by the cache service.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use tracing::{debug, warn};

use super::{CacheRecord, TopicCache};
use crate::config::SupabaseConfig;
use crate::error::{ArchError, Result};

/// PostgREST table holding cached topic documents.
const TABLE: &str = "topic_cache";

/// [`TopicCache`] backed by a Supabase REST table.
pub struct SupabaseCache {
    base_url: String,
    api_key: String,
    client: Client,
}

impl std::fmt::Debug for SupabaseCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseCache")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl SupabaseCache {
    pub fn new(config: &SupabaseConfig) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| ArchError::Config(format!("failed to build cache HTTP client: {e}")))?;
        Ok(Self {
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            client,
        })
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, TABLE)
    }

    fn with_auth(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header(CONTENT_TYPE, "application/json")
    }
}

#[async_trait]
impl TopicCache for SupabaseCache {
    async fn lookup(&self, topic_id: &str) -> Option<Value> {
        let filter = format!("eq.{topic_id}");
        let request = self
            .with_auth(self.client.get(self.table_url()))
            .header("Prefer", "return=representation")
            .query(&[("topic_id", filter.as_str()), ("select", "data")]);

        let response = match request.send().await {
            Ok(r) => r,
            Err(e) => {
                warn!(topic_id, error = %e, "Cache lookup failed, treating as miss");
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!(topic_id, status = status.as_u16(), "Cache lookup rejected, treating as miss");
            return None;
        }

        let rows: Vec<Value> = match response.json().await {
            Ok(rows) => rows,
            Err(e) => {
                warn!(topic_id, error = %e, "Cache lookup returned malformed rows");
                return None;
            }
        };

        debug!(topic_id, rows = rows.len(), "supabase cache lookup");
        rows.into_iter()
            .next()
            .and_then(|mut row| row.get_mut("data").map(Value::take))
    }

    async fn upsert(&self, topic_id: &str, document: &Value) {
        let record = CacheRecord::new(topic_id, document.clone());
        let request = self
            .with_auth(self.client.post(self.table_url()))
            .header("Prefer", "resolution=merge-duplicates")
            .json(&record);

        match request.send().await {
            Ok(response) if response.status().is_success() => {
                debug!(topic_id, "supabase cache upsert");
            }
            Ok(response) => {
                warn!(topic_id, status = response.status().as_u16(), "Cache upsert rejected");
            }
            Err(e) => {
                warn!(topic_id, error = %e, "Cache upsert failed");
            }
        }
    }

    fn name(&self) -> &'static str {
        "supabase"
    }
}
