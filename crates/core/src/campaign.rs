//! Campaign configuration types and payload validation.
//!
//! The wire payload (`CampaignPayload`) is deliberately loose: every field
//! is optional so a partially filled form deserializes instead of bouncing
//! with a serde error. [`CampaignConfig::from_payload`] is where the real
//! rules live. Tester entries missing a name or an email are dropped
//! silently at that point, not rejected.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::CampaignError;

/// A named email recipient enrolled in the campaign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tester {
    pub name: String,
    pub email: String,
}

/// Raw tester entry as submitted. Incomplete entries are filtered out.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TesterInput {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Wall-clock time of day the daily reminder fires, 24-hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderTime {
    pub hour: u8,
    pub minute: u8,
}

impl FromStr for ReminderTime {
    type Err = CampaignError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CampaignError::InvalidReminderTime(s.to_string());
        let (h, m) = s.trim().split_once(':').ok_or_else(invalid)?;
        let hour: u8 = h.parse().map_err(|_| invalid())?;
        let minute: u8 = m.parse().map_err(|_| invalid())?;
        if hour > 23 || minute > 59 {
            return Err(invalid());
        }
        Ok(Self { hour, minute })
    }
}

impl fmt::Display for ReminderTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl Serialize for ReminderTime {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Configure-request body. CamelCase on the wire.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CampaignPayload {
    pub app_name: Option<String>,
    pub app_version: Option<String>,
    pub play_console_link: Option<String>,
    pub start_date: Option<String>,
    pub total_days: Option<u32>,
    pub reminder_time_of_day: Option<String>,
    pub timezone: Option<String>,
    pub testers: Vec<TesterInput>,
    pub sender_address: Option<String>,
    pub sender_credential: Option<String>,
    pub mail_service: Option<String>,
}

/// The single active campaign. Held in process-lifetime state only;
/// replaced wholesale by a reconfigure and discarded without trace on stop.
#[derive(Debug, Clone)]
pub struct CampaignConfig {
    pub app_name: String,
    pub app_version: String,
    pub play_console_link: String,
    /// Campaign day 1 begins at local midnight of this date.
    pub start_date: NaiveDate,
    /// Campaign length; day numbers are valid in `[1, total_days]`.
    pub total_days: u32,
    pub reminder_time: ReminderTime,
    /// IANA timezone the daily trigger fires in. Validated, stored as text.
    pub timezone: String,
    /// Non-empty after filtering.
    pub testers: Vec<Tester>,
    pub sender_address: String,
    pub sender_credential: String,
    pub mail_service: String,
}

const DEFAULT_TOTAL_DAYS: u32 = 14;
const DEFAULT_TIMEZONE: &str = "UTC";

impl CampaignConfig {
    /// Validate a raw payload into an active-campaign config.
    ///
    /// `today` anchors the campaign when `startDate` is absent.
    pub fn from_payload(
        payload: CampaignPayload,
        today: NaiveDate,
    ) -> Result<Self, CampaignError> {
        let app_name = require(payload.app_name, "appName")?;
        let sender_address = require(payload.sender_address, "senderAddress")?;
        let sender_credential = require(payload.sender_credential, "senderCredential")?;
        let reminder_time: ReminderTime =
            require(payload.reminder_time_of_day, "reminderTimeOfDay")?.parse()?;

        let total_days = payload.total_days.unwrap_or(DEFAULT_TOTAL_DAYS);
        if total_days < 1 {
            return Err(CampaignError::InvalidTotalDays);
        }

        let timezone = payload
            .timezone
            .filter(|tz| !tz.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_TIMEZONE.to_string());
        timezone
            .parse::<chrono_tz::Tz>()
            .map_err(|_| CampaignError::UnknownTimezone(timezone.clone()))?;

        let start_date = match payload.start_date.filter(|s| !s.trim().is_empty()) {
            Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
                .map_err(|_| CampaignError::InvalidStartDate(s))?,
            None => today,
        };

        let testers = filter_testers(payload.testers);
        if testers.is_empty() {
            return Err(CampaignError::NoTesters);
        }

        Ok(Self {
            app_name,
            app_version: payload.app_version.unwrap_or_default(),
            play_console_link: payload.play_console_link.unwrap_or_default(),
            start_date,
            total_days,
            reminder_time,
            timezone,
            testers,
            sender_address,
            sender_credential,
            mail_service: payload.mail_service.unwrap_or_default(),
        })
    }
}

fn require(value: Option<String>, field: &'static str) -> Result<String, CampaignError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(CampaignError::MissingField(field)),
    }
}

/// Keep only entries with both a non-empty name and a non-empty email.
fn filter_testers(inputs: Vec<TesterInput>) -> Vec<Tester> {
    inputs
        .into_iter()
        .filter_map(|t| match (t.name, t.email) {
            (Some(name), Some(email))
                if !name.trim().is_empty() && !email.trim().is_empty() =>
            {
                Some(Tester {
                    name: name.trim().to_string(),
                    email: email.trim().to_string(),
                })
            }
            _ => None,
        })
        .collect()
}
