//! Liveness and landing endpoints.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::Local;
use serde::Serialize;

use nudge_core::clock;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Returns 200 unconditionally.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: "nudge",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexResponse {
    pub service: &'static str,
    pub version: &'static str,
    pub configured: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_day: Option<i64>,
}

/// `GET /` — liveness plus a one-line campaign summary.
pub async fn index(State(state): State<Arc<AppState>>) -> Json<IndexResponse> {
    let config = state.campaign.current().await;
    let now = Local::now().naive_local();
    Json(IndexResponse {
        service: "nudge",
        version: env!("CARGO_PKG_VERSION"),
        configured: config.is_some(),
        app_name: config.as_ref().map(|c| c.app_name.clone()),
        current_day: config.as_ref().map(|c| clock::current_day(c.start_date, now)),
    })
}
