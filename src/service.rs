//! Cache-or-generate topic retrieval and chat passthrough.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::cache::{is_usable, TopicCache};
use crate::error::Result;
use crate::gateway::Gateway;
use crate::providers::LlmProvider;

/// Request flow shared by the HTTP handlers and the CLI.
///
/// Concurrent misses for the same topic are not coalesced: each one
/// generates and writes, and the last write wins.
pub struct TopicService {
    cache: Arc<dyn TopicCache>,
    gateway: Gateway,
}

impl TopicService {
    pub fn new(cache: Arc<dyn TopicCache>, provider: Arc<dyn LlmProvider>) -> Self {
        Self {
            cache,
            gateway: Gateway::new(provider),
        }
    }

    pub fn model(&self) -> &str {
        self.gateway.model()
    }

    /// Return the document for `topic_id`, generating it on a miss or when
    /// `refresh` is set.
    ///
    /// A generated document is written to the cache before it is returned;
    /// the write outcome does not affect the result. Gateway failures
    /// propagate and leave the cache untouched.
    pub async fn get_topic(&self, topic_id: &str, refresh: bool) -> Result<Value> {
        if !refresh {
            match self.cache.lookup(topic_id).await {
                Some(doc) if is_usable(&doc) => {
                    debug!(topic_id, cache = self.cache.name(), "Topic cache hit");
                    return Ok(doc);
                }
                _ => debug!(topic_id, "Topic cache miss"),
            }
        }

        let document = self.gateway.generate_topic(topic_id).await?;
        let value = serde_json::to_value(&document)?;
        self.cache.upsert(topic_id, &value).await;
        Ok(value)
    }

    /// Mentor chat; never touches the cache.
    pub async fn chat(&self, message: &str, context_title: Option<&str>) -> Result<String> {
        self.gateway.chat(message, context_title).await
    }
}
