//! Topic retrieval route.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::sync::Arc;

use crate::api::error::ApiError;
use crate::api::server::AppState;

/// Query string for `GET /api/topics/{topic_id}`.
#[derive(Debug, Default, Deserialize)]
pub struct TopicQuery {
    /// Bypass the cache and regenerate.
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub refresh: bool,
}

/// Accept the usual query-string spellings of a boolean.
fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_flag(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid boolean: {raw}")))
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// GET /api/topics/{topic_id}?refresh=<bool>
pub async fn get_topic(
    State(state): State<Arc<AppState>>,
    Path(topic_id): Path<String>,
    Query(query): Query<TopicQuery>,
) -> Result<Json<Value>, ApiError> {
    let document = state.service.get_topic(&topic_id, query.refresh).await?;
    Ok(Json(document))
}
