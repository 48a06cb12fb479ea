//! Axum API server for ArchMaster.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::service::TopicService;

/// Shared state for all API handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<TopicService>,
}

impl AppState {
    pub fn new(service: Arc<TopicService>) -> Self {
        Self { service }
    }
}

/// Build the axum router with all API routes.
pub fn build_router(state: AppState) -> Router {
    let shared_state = Arc::new(state);

    // CORS: any origin, method and header; the origin is mirrored so
    // credentialed browser requests are accepted too.
    let cors = CorsLayer::very_permissive();

    Router::new()
        .route("/api/health", get(super::routes::health::get_health))
        .route(
            "/api/topics/{topic_id}",
            get(super::routes::topics::get_topic),
        )
        .route("/api/chat", post(super::routes::chat::chat))
        // Body size limit: 1 MiB.
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(shared_state)
}

/// Start the API server and run until Ctrl-C.
pub async fn start_server(
    config: &ServerConfig,
    state: AppState,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let app = build_router(state);
    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("ArchMaster API listening on {addr}");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("ArchMaster API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
}
