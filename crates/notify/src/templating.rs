//! Minijinja rendering of the daily reminder message.
//!
//! Rendering is a pure function of the tester name, day number, and campaign
//! config: no clock, no environment access, no randomness. Calling it twice
//! with the same inputs yields byte-identical output.
//!
//! Templates are fixed strings, so a fresh [`minijinja::Environment`] is
//! created per render call rather than kept around.

use nudge_core::CampaignConfig;

use crate::traits::NotifyError;

const SUBJECT_TEMPLATE: &str =
    "Day {{ day }} of {{ total_days }} - {{ app_name }} testing reminder";

const BODY_TEMPLATE: &str = "\
Hi {{ tester_name }},

{{ progress_bar }}

This is day {{ day }} of the {{ total_days }}-day {{ app_name }}\
{% if app_version %} {{ app_version }}{% endif %} closed test. \
You're {{ percent }}% through, with {{ days_remaining }} day(s) remaining.

Today's checklist:
  [ ] Open the app at least once
  [ ] Use it the way you normally would
  [ ] Report anything that feels broken or confusing
{% if play_console_link %}
Manage your tester enrollment here:
{{ play_console_link }}
{% endif %}
Please keep the app installed until the test window ends.

Thanks for testing!
The {{ app_name }} team
";

/// Width of the textual progress bar, in characters.
const BAR_WIDTH: i64 = 20;

/// Context handed to the subject and body templates.
#[derive(Debug, Clone, serde::Serialize)]
struct ReminderContext<'a> {
    tester_name: &'a str,
    app_name: &'a str,
    app_version: &'a str,
    play_console_link: &'a str,
    day: i64,
    total_days: u32,
    percent: i64,
    progress_bar: String,
    days_remaining: i64,
}

/// A rendered reminder, ready to hand to a [`crate::Mailer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedReminder {
    pub subject: String,
    pub body: String,
}

/// Renders the daily reminder for one tester.
pub struct ReminderRenderer;

impl ReminderRenderer {
    /// Render subject and body for `tester_name` on campaign day `day`.
    ///
    /// Performs no bounds check on `day`; callers keep it inside the
    /// eligibility window in normal flow. `days_remaining` may go negative
    /// if they don't.
    pub fn render(
        tester_name: &str,
        day: i64,
        config: &CampaignConfig,
    ) -> Result<RenderedReminder, NotifyError> {
        let total = i64::from(config.total_days);
        let percent = (100.0 * day as f64 / total as f64).round() as i64;

        let ctx = ReminderContext {
            tester_name,
            app_name: &config.app_name,
            app_version: &config.app_version,
            play_console_link: &config.play_console_link,
            day,
            total_days: config.total_days,
            percent,
            progress_bar: progress_bar(percent),
            days_remaining: total - day,
        };

        let env = minijinja::Environment::new();
        let subject = env
            .render_str(SUBJECT_TEMPLATE, &ctx)
            .map_err(|e| NotifyError::Template(e.to_string()))?;
        let body = env
            .render_str(BODY_TEMPLATE, &ctx)
            .map_err(|e| NotifyError::Template(e.to_string()))?;

        Ok(RenderedReminder { subject, body })
    }
}

/// Textual progress indicator, e.g. `[##########----------] 50%`.
///
/// The fill is clamped to `[0, 100]` so out-of-window day numbers still
/// produce a drawable bar; the percent label is left unclamped.
fn progress_bar(percent: i64) -> String {
    let filled = (percent.clamp(0, 100) * BAR_WIDTH) / 100;
    format!(
        "[{}{}] {}%",
        "#".repeat(filled as usize),
        "-".repeat((BAR_WIDTH - filled) as usize),
        percent
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use nudge_core::{ReminderTime, Tester};

    fn config(total_days: u32) -> CampaignConfig {
        CampaignConfig {
            app_name: "Orbit".to_string(),
            app_version: "1.4.2".to_string(),
            play_console_link: "https://play.google.com/console/x".to_string(),
            start_date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            total_days,
            reminder_time: ReminderTime { hour: 9, minute: 0 },
            timezone: "UTC".to_string(),
            testers: vec![Tester {
                name: "Alice".to_string(),
                email: "alice@example.com".to_string(),
            }],
            sender_address: "team@example.com".to_string(),
            sender_credential: "pw".to_string(),
            mail_service: "gmail".to_string(),
        }
    }

    #[test]
    fn rendering_is_deterministic() {
        let cfg = config(14);
        let a = ReminderRenderer::render("Alice", 7, &cfg).unwrap();
        let b = ReminderRenderer::render("Alice", 7, &cfg).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn halfway_point_is_fifty_percent() {
        let out = ReminderRenderer::render("A", 7, &config(14)).unwrap();
        assert!(out.body.contains("50%"), "body: {}", out.body);
    }

    #[test]
    fn one_of_three_rounds_to_thirty_three() {
        let out = ReminderRenderer::render("A", 1, &config(3)).unwrap();
        assert!(out.body.contains("33%"), "body: {}", out.body);
    }

    #[test]
    fn two_of_three_rounds_half_up() {
        // 66.67 rounds to 67.
        let out = ReminderRenderer::render("A", 2, &config(3)).unwrap();
        assert!(out.body.contains("67%"), "body: {}", out.body);
    }

    #[test]
    fn subject_carries_day_and_total() {
        let out = ReminderRenderer::render("Alice", 3, &config(14)).unwrap();
        assert_eq!(out.subject, "Day 3 of 14 - Orbit testing reminder");
    }

    #[test]
    fn body_embeds_tester_name_and_remaining_days() {
        let out = ReminderRenderer::render("Alice", 5, &config(14)).unwrap();
        assert!(out.body.contains("Hi Alice,"));
        assert!(out.body.contains("9 day(s) remaining"));
    }

    #[test]
    fn console_link_included_when_present() {
        let out = ReminderRenderer::render("Alice", 1, &config(14)).unwrap();
        assert!(out.body.contains("https://play.google.com/console/x"));
    }

    #[test]
    fn console_link_section_omitted_when_empty() {
        let mut cfg = config(14);
        cfg.play_console_link = String::new();
        let out = ReminderRenderer::render("Alice", 1, &cfg).unwrap();
        assert!(!out.body.contains("Manage your tester enrollment"));
    }

    #[test]
    fn version_omitted_when_empty() {
        let mut cfg = config(14);
        cfg.app_version = String::new();
        let out = ReminderRenderer::render("Alice", 1, &cfg).unwrap();
        assert!(out.body.contains("14-day Orbit closed test"));
    }

    #[test]
    fn out_of_window_day_still_renders() {
        // No bounds check by contract; remaining goes negative.
        let out = ReminderRenderer::render("Alice", 20, &config(14)).unwrap();
        assert!(out.body.contains("-6 day(s) remaining"));
    }

    #[test]
    fn progress_bar_shape() {
        assert_eq!(progress_bar(0), "[--------------------] 0%");
        assert_eq!(progress_bar(50), "[##########----------] 50%");
        assert_eq!(progress_bar(100), "[####################] 100%");
        // Label unclamped, fill clamped.
        assert_eq!(progress_bar(143), "[####################] 143%");
    }
}
