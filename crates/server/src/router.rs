//! HTTP router construction.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::api;
use crate::state::AppState;

/// Assemble all routes and middleware into a single `Router`.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(api::index))
        .route("/health", get(api::health))
        .route("/api/health", get(api::health))
        .route("/status", get(api::status))
        .route("/api/status", get(api::status))
        .route("/api/configure", post(api::configure))
        .route("/api/test-email", post(api::test_email))
        .route("/api/trigger", post(api::trigger))
        .route("/trigger", get(api::trigger_with_secret))
        .route("/api/stop", post(api::stop))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
