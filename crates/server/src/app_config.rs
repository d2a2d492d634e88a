//! Environment-driven deployment configuration.
//!
//! The server itself needs only `PORT` and `API_SECRET`. A full campaign
//! can additionally be seeded from env vars and applied at startup through
//! the same configure path the API uses.

use chrono::NaiveDate;
use tracing::warn;

use nudge_core::{CampaignPayload, TesterInput};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.is_empty())
}

pub struct ServerConfig {
    pub port: u16,
    /// Shared secret for `GET /trigger`.
    pub api_secret: Option<String>,
    /// Campaign seeded from env vars, applied at startup when present.
    pub env_campaign: Option<CampaignPayload>,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self {
            port: env_or("PORT", "3000").parse().unwrap_or(3000),
            api_secret: env_opt("API_SECRET"),
            env_campaign: campaign_from_env(),
        }
    }
}

/// Assemble a configure payload from env vars. `EMAIL_FROM` is the marker:
/// without it the server starts unconfigured and waits for the API.
fn campaign_from_env() -> Option<CampaignPayload> {
    let sender_address = env_opt("EMAIL_FROM")?;

    let testers = match env_opt("TESTERS") {
        Some(raw) => parse_testers(&raw),
        None => Vec::new(),
    };

    Some(CampaignPayload {
        app_name: env_opt("APP_NAME"),
        app_version: env_opt("APP_VERSION"),
        play_console_link: env_opt("PLAY_CONSOLE_LINK"),
        start_date: validated_start_date(env_opt("START_DATE")),
        total_days: env_opt("TOTAL_DAYS").and_then(|v| v.parse().ok()),
        reminder_time_of_day: env_opt("REMINDER_TIME"),
        timezone: env_opt("TIMEZONE"),
        testers,
        sender_address: Some(sender_address),
        sender_credential: env_opt("EMAIL_PASSWORD"),
        mail_service: env_opt("EMAIL_SERVICE"),
    })
}

/// Malformed `TESTERS` JSON yields an empty list (logged, not fatal);
/// validation then rejects the campaign for having no testers rather than
/// starting an empty one.
fn parse_testers(raw: &str) -> Vec<TesterInput> {
    match serde_json::from_str(raw) {
        Ok(testers) => testers,
        Err(e) => {
            warn!(error = %e, "TESTERS is not a valid JSON array, using empty tester list");
            Vec::new()
        }
    }
}

/// A malformed `START_DATE` falls back to today instead of failing.
fn validated_start_date(raw: Option<String>) -> Option<String> {
    raw.and_then(|s| {
        if NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").is_ok() {
            Some(s)
        } else {
            warn!(value = %s, "START_DATE is not YYYY-MM-DD, falling back to today");
            None
        }
    })
}
