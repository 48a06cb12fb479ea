//! Mapping from [`ArchError`] to HTTP responses.
//!
//! Error bodies are `{"detail": "<message>"}`. Only the empty-response case
//! carries a specific status and message; everything else is a generic 500
//! with the cause logged server-side.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use crate::error::ArchError;

/// Error returned by API handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
    }
}

impl From<ArchError> for ApiError {
    fn from(err: ArchError) -> Self {
        match err {
            ArchError::EmptyResponse => {
                error!("Topic generation returned no output");
                Self::new(StatusCode::BAD_GATEWAY, err.to_string())
            }
            other => {
                error!(error = %other, "Request failed");
                Self::internal()
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}
