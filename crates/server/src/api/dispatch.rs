//! Manual dispatch and test-notification endpoints.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;
use chrono::Local;
use serde::{Deserialize, Serialize};

use nudge_core::clock;
use nudge_notify::{DispatchReport, OutgoingEmail, ReminderRenderer};

use super::{bad_request, unauthorized, ApiError};
use crate::state::AppState;

/// `POST /api/trigger` — run one dispatch pass now, out of band from the
/// schedule. Not mutually excluded against the scheduled trigger; two
/// passes on the same eligible day send duplicate reminders.
pub async fn trigger(State(state): State<Arc<AppState>>) -> Json<DispatchReport> {
    Json(state.run_dispatch_pass().await)
}

#[derive(Deserialize)]
pub struct TriggerQuery {
    pub secret: Option<String>,
}

/// `GET /trigger` — same pass, guarded by the shared secret from either
/// the `x-api-secret` header or the `secret` query parameter. 401 with no
/// side effect on mismatch, or when no secret is configured at all.
pub async fn trigger_with_secret(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TriggerQuery>,
    headers: HeaderMap,
) -> Result<Json<DispatchReport>, ApiError> {
    let provided = headers
        .get("x-api-secret")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .or(query.secret);

    let authorized = matches!(
        (&state.api_secret, &provided),
        (Some(expected), Some(given)) if expected == given
    );
    if !authorized {
        return Err(unauthorized());
    }

    Ok(Json(state.run_dispatch_pass().await))
}

#[derive(Debug, Default, Deserialize)]
pub struct TestEmailRequest {
    pub email: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestEmailResponse {
    pub success: bool,
    pub sent_to: String,
    pub day: i64,
}

/// `POST /api/test-email` — send one reminder to an explicit address or,
/// with no body, to the first tester on file.
pub async fn test_email(
    State(state): State<Arc<AppState>>,
    payload: Option<Json<TestEmailRequest>>,
) -> Result<Json<TestEmailResponse>, ApiError> {
    let Some(config) = state.campaign.current().await else {
        return Err(bad_request("no active campaign"));
    };
    let mailer = state.mailer.read().await.clone();
    let Some(mailer) = mailer else {
        return Err(bad_request("no mail transport available"));
    };

    let requested = payload
        .and_then(|Json(p)| p.email)
        .filter(|e| !e.trim().is_empty());
    let target = match requested {
        Some(email) => email.trim().to_string(),
        None => match config.testers.first() {
            Some(t) => t.email.clone(),
            None => return Err(bad_request("no target email resolvable")),
        },
    };

    // Address the recipient by tester name when the target is on file.
    let name = config
        .testers
        .iter()
        .find(|t| t.email == target)
        .map(|t| t.name.clone())
        .unwrap_or_else(|| "Tester".to_string());

    // Clamp out-of-window days so a pre-campaign smoke test reads sensibly.
    let now = Local::now().naive_local();
    let day =
        clock::current_day(config.start_date, now).clamp(1, i64::from(config.total_days));

    let rendered = ReminderRenderer::render(&name, day, &config).map_err(bad_request)?;
    let mail = OutgoingEmail {
        to: target.clone(),
        subject: format!("[TEST] {}", rendered.subject),
        body: rendered.body,
    };
    mailer.send(&mail).await.map_err(bad_request)?;

    Ok(Json(TestEmailResponse {
        success: true,
        sent_to: target,
        day,
    }))
}
