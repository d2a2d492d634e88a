use thiserror::Error;

/// Reasons a campaign configuration is rejected.
#[derive(Error, Debug)]
pub enum CampaignError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("invalid reminder time '{0}': expected 24-hour HH:MM")]
    InvalidReminderTime(String),

    #[error("invalid start date '{0}': expected YYYY-MM-DD")]
    InvalidStartDate(String),

    #[error("unknown timezone: {0}")]
    UnknownTimezone(String),

    #[error("totalDays must be at least 1")]
    InvalidTotalDays,

    #[error("tester list is empty after dropping incomplete entries")]
    NoTesters,
}
