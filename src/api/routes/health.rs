//! Health endpoint.

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::api::server::AppState;

/// GET /api/health: liveness plus the model topics are generated with.
pub async fn get_health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "archmaster",
        "model": state.service.model(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
