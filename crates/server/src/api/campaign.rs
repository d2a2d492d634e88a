//! Configure, status, and stop endpoints.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::{Local, NaiveDate};
use serde::Serialize;
use tracing::info;

use nudge_core::{clock, CampaignConfig, CampaignError, CampaignPayload, Tester};
use nudge_notify::NotifyError;

use super::{bad_request, ApiError};
use crate::state::AppState;

/// Why a configure attempt was rejected. The previously active campaign,
/// if any, stays untouched in every case.
#[derive(Debug, thiserror::Error)]
pub enum ConfigureError {
    #[error("{0}")]
    Invalid(#[from] CampaignError),

    #[error("mail transport verification failed: {0}")]
    Mail(#[from] NotifyError),

    #[error("failed to install reminder schedule: {0}")]
    Schedule(String),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigureResponse {
    pub success: bool,
    pub message: String,
    pub app_name: String,
    pub start_date: NaiveDate,
    pub total_days: u32,
    pub reminder_time_of_day: String,
    pub timezone: String,
    pub testers: usize,
    pub current_day: i64,
}

/// The one configure path: validate, probe the mail transport, then swap
/// the campaign slot and re-install the schedule. Shared by the HTTP
/// handler and the env-seeded startup.
pub async fn apply_configuration(
    state: &Arc<AppState>,
    payload: CampaignPayload,
) -> Result<ConfigureResponse, ConfigureError> {
    let now = Local::now().naive_local();
    let config = CampaignConfig::from_payload(payload, now.date())?;

    // Probe before touching any live state; a dead transport rejects the
    // whole configure and leaves the previous campaign running.
    let mailer = state.mailer_factory.build(&config)?;
    mailer.verify().await?;

    let config = Arc::new(config);
    state
        .schedule
        .install(config.reminder_time, &config.timezone, Arc::clone(state))
        .map_err(|e| ConfigureError::Schedule(e.to_string()))?;
    state.campaign.replace(Arc::clone(&config)).await;
    *state.mailer.write().await = Some(mailer);

    info!(
        app = %config.app_name,
        testers = config.testers.len(),
        start = %config.start_date,
        time = %config.reminder_time,
        timezone = %config.timezone,
        "campaign configured"
    );

    Ok(ConfigureResponse {
        success: true,
        message: format!("campaign configured with {} tester(s)", config.testers.len()),
        app_name: config.app_name.clone(),
        start_date: config.start_date,
        total_days: config.total_days,
        reminder_time_of_day: config.reminder_time.to_string(),
        timezone: config.timezone.clone(),
        testers: config.testers.len(),
        current_day: clock::current_day(config.start_date, now),
    })
}

/// `POST /api/configure`
pub async fn configure(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CampaignPayload>,
) -> Result<Json<ConfigureResponse>, ApiError> {
    apply_configuration(&state, payload)
        .await
        .map(Json)
        .map_err(bad_request)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignStatus {
    pub app_name: String,
    pub app_version: String,
    pub play_console_link: String,
    pub start_date: NaiveDate,
    pub total_days: u32,
    pub reminder_time_of_day: String,
    pub timezone: String,
    pub testers: Vec<Tester>,
    pub sender_address: String,
    pub mail_service: String,
    pub current_day: i64,
    pub days_remaining: i64,
    pub eligible: bool,
    pub schedule_active: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub configured: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub campaign: Option<CampaignStatus>,
}

/// `GET /status`, `GET /api/status` — read-only projection. The sender
/// credential never appears here.
pub async fn status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let Some(config) = state.campaign.current().await else {
        return Json(StatusResponse {
            configured: false,
            message: Some("no active campaign"),
            campaign: None,
        });
    };

    let now = Local::now().naive_local();
    Json(StatusResponse {
        configured: true,
        message: None,
        campaign: Some(CampaignStatus {
            app_name: config.app_name.clone(),
            app_version: config.app_version.clone(),
            play_console_link: config.play_console_link.clone(),
            start_date: config.start_date,
            total_days: config.total_days,
            reminder_time_of_day: config.reminder_time.to_string(),
            timezone: config.timezone.clone(),
            testers: config.testers.clone(),
            sender_address: config.sender_address.clone(),
            mail_service: config.mail_service.clone(),
            current_day: clock::current_day(config.start_date, now),
            days_remaining: clock::days_remaining(config.start_date, config.total_days, now),
            eligible: clock::is_eligible(config.start_date, config.total_days, now),
            schedule_active: state.schedule.is_installed(),
        }),
    })
}

#[derive(Serialize)]
pub struct StopResponse {
    pub success: bool,
    pub message: &'static str,
}

/// `POST /api/stop` — tear down the schedule and discard the campaign.
/// Idempotent.
pub async fn stop(State(state): State<Arc<AppState>>) -> Json<StopResponse> {
    state.schedule.uninstall();
    state.campaign.clear().await;
    *state.mailer.write().await = None;
    info!("campaign stopped, configuration cleared");
    Json(StopResponse {
        success: true,
        message: "campaign stopped",
    })
}
