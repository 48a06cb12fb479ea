//! HTTP API: topic retrieval, mentor chat and a health check.

pub mod error;
pub mod routes;
pub mod server;

pub use error::ApiError;
pub use server::{build_router, start_server, AppState};
