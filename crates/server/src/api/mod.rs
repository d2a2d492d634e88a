//! HTTP endpoint modules.
//!
//! Shared error-response plumbing lives here; each sub-module owns one
//! responsibility area.

mod campaign;
mod dispatch;
mod health;

use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

/// Body of every non-2xx response.
#[derive(Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

pub(crate) type ApiError = (StatusCode, Json<ErrorResponse>);

pub(crate) fn bad_request(error: impl ToString) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            success: false,
            error: error.to_string(),
        }),
    )
}

pub(crate) fn unauthorized() -> ApiError {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse {
            success: false,
            error: "invalid or missing API secret".to_string(),
        }),
    )
}

// Re-exports keep flat `api::foo` paths in the router.

pub use campaign::{apply_configuration, configure, status, stop, ConfigureError, ConfigureResponse};
pub use dispatch::{test_email, trigger, trigger_with_secret};
pub use health::{health, index};
