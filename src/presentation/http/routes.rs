//! Route Configuration
//!
//! Configures all HTTP routes for the service.

use axum::{
    response::IntoResponse,
    routing::{get, post},
    Router,
};

use super::handlers;
use crate::infrastructure::metrics;
use crate::presentation::websocket::ws_handler;
use crate::startup::AppState;

/// Create the main router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // WebSocket chat endpoint
        .route("/ws/chat/{room_id}", get(ws_handler))
        // Language preference endpoints
        .route("/api/chat/set-language", post(handlers::set_language))
        .route("/api/chat/get-language", get(handlers::get_language))
        // Health check endpoint
        .route("/health", get(handlers::health_check))
        // Prometheus metrics endpoint
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

/// Prometheus metrics endpoint handler
async fn metrics_handler() -> impl IntoResponse {
    (
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        metrics::gather(),
    )
}
