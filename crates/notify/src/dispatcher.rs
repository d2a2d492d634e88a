//! One dispatch pass over the tester list.
//!
//! Delivery attempts are strictly sequential, one in flight at a time. A
//! failed recipient is recorded and the loop moves on; nothing aborts the
//! pass and nothing is retried. Running two passes on the same eligible day
//! sends duplicate reminders; the system does not deduplicate.

use chrono::NaiveDateTime;
use serde::Serialize;

use nudge_core::{clock, CampaignConfig};

use crate::templating::ReminderRenderer;
use crate::traits::{Mailer, OutgoingEmail};

/// Per-tester delivery outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SendStatus {
    Sent,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TesterOutcome {
    pub tester: String,
    pub email: String,
    pub status: SendStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of one dispatch pass. Ephemeral: returned to the caller and
/// logged, never stored.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum DispatchReport {
    /// No active campaign (or no mail transport). Not an error.
    NotConfigured,
    /// Today is outside the eligibility window. Normal outcome, zero sends.
    Skipped { day: i64, total_days: u32 },
    /// One attempt was made per tester.
    Completed {
        day: i64,
        total_days: u32,
        sent: usize,
        failed: usize,
        results: Vec<TesterOutcome>,
    },
}

/// Runs dispatch passes.
pub struct ReminderDispatcher;

impl ReminderDispatcher {
    /// Attempt to notify every tester of the given campaign.
    ///
    /// Never returns an error; every failure mode is a variant of the
    /// report. Exactly one send attempt per tester when eligible.
    pub async fn dispatch(
        config: Option<&CampaignConfig>,
        mailer: Option<&dyn Mailer>,
        now: NaiveDateTime,
    ) -> DispatchReport {
        let (Some(config), Some(mailer)) = (config, mailer) else {
            tracing::info!("dispatch requested with no active campaign");
            return DispatchReport::NotConfigured;
        };

        let day = clock::current_day(config.start_date, now);
        if !clock::is_eligible(config.start_date, config.total_days, now) {
            tracing::info!(
                day,
                total_days = config.total_days,
                "outside campaign window, skipping dispatch"
            );
            return DispatchReport::Skipped {
                day,
                total_days: config.total_days,
            };
        }

        let mut results = Vec::with_capacity(config.testers.len());

        for tester in &config.testers {
            let attempt = match ReminderRenderer::render(&tester.name, day, config) {
                Ok(reminder) => {
                    let mail = OutgoingEmail {
                        to: tester.email.clone(),
                        subject: reminder.subject,
                        body: reminder.body,
                    };
                    mailer.send(&mail).await
                }
                Err(e) => Err(e),
            };

            let outcome = match attempt {
                Ok(()) => {
                    tracing::info!(tester = %tester.email, day, "reminder delivered");
                    TesterOutcome {
                        tester: tester.name.clone(),
                        email: tester.email.clone(),
                        status: SendStatus::Sent,
                        error: None,
                    }
                }
                Err(e) => {
                    tracing::warn!(tester = %tester.email, day, error = %e, "reminder delivery failed");
                    TesterOutcome {
                        tester: tester.name.clone(),
                        email: tester.email.clone(),
                        status: SendStatus::Failed,
                        error: Some(e.to_string()),
                    }
                }
            };
            results.push(outcome);
        }

        let sent = results.iter().filter(|r| r.status == SendStatus::Sent).count();
        let failed = results.len() - sent;
        tracing::info!(day, sent, failed, "dispatch pass complete");

        DispatchReport::Completed {
            day,
            total_days: config.total_days,
            sent,
            failed,
            results,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use chrono::{Duration, NaiveDate};
    use nudge_core::{ReminderTime, Tester};

    use crate::traits::NotifyError;

    struct MockMailer {
        send_count: Arc<AtomicUsize>,
        /// Recipient addresses that should fail delivery.
        fail_for: Vec<String>,
    }

    impl MockMailer {
        fn new() -> (Self, Arc<AtomicUsize>) {
            let count = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    send_count: count.clone(),
                    fail_for: Vec::new(),
                },
                count,
            )
        }

        fn failing_for(addresses: &[&str]) -> (Self, Arc<AtomicUsize>) {
            let (mut mailer, count) = Self::new();
            mailer.fail_for = addresses.iter().map(|s| s.to_string()).collect();
            (mailer, count)
        }
    }

    #[async_trait::async_trait]
    impl Mailer for MockMailer {
        async fn send(&self, mail: &OutgoingEmail) -> Result<(), NotifyError> {
            self.send_count.fetch_add(1, Ordering::SeqCst);
            if self.fail_for.contains(&mail.to) {
                Err(NotifyError::Smtp("mock delivery failure".to_string()))
            } else {
                Ok(())
            }
        }

        async fn verify(&self) -> Result<(), NotifyError> {
            Ok(())
        }

        fn transport_name(&self) -> &str {
            "mock"
        }
    }

    fn campaign(start: NaiveDate, total_days: u32, testers: &[(&str, &str)]) -> CampaignConfig {
        CampaignConfig {
            app_name: "Orbit".to_string(),
            app_version: String::new(),
            play_console_link: String::new(),
            start_date: start,
            total_days,
            reminder_time: ReminderTime { hour: 9, minute: 0 },
            timezone: "UTC".to_string(),
            testers: testers
                .iter()
                .map(|(n, e)| Tester {
                    name: n.to_string(),
                    email: e.to_string(),
                })
                .collect(),
            sender_address: "team@example.com".to_string(),
            sender_credential: "pw".to_string(),
            mail_service: "gmail".to_string(),
        }
    }

    fn noon(d: NaiveDate) -> NaiveDateTime {
        d.and_hms_opt(12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn no_config_yields_not_configured() {
        let (mailer, count) = MockMailer::new();
        let report = ReminderDispatcher::dispatch(
            None,
            Some(&mailer),
            noon(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()),
        )
        .await;
        assert!(matches!(report, DispatchReport::NotConfigured));
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn past_window_skips_with_zero_sends() {
        let start = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let config = campaign(start, 14, &[("Alice", "alice@example.com")]);
        let (mailer, count) = MockMailer::new();

        let now = noon(start + Duration::days(20));
        let report = ReminderDispatcher::dispatch(Some(&config), Some(&mailer), now).await;

        match report {
            DispatchReport::Skipped { day, total_days } => {
                assert_eq!(day, 21);
                assert_eq!(total_days, 14);
            }
            other => panic!("expected Skipped, got {other:?}"),
        }
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn before_window_skips() {
        let start = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        let config = campaign(start, 14, &[("Alice", "alice@example.com")]);
        let (mailer, count) = MockMailer::new();

        let now = noon(NaiveDate::from_ymd_opt(2026, 3, 8).unwrap());
        let report = ReminderDispatcher::dispatch(Some(&config), Some(&mailer), now).await;

        assert!(matches!(report, DispatchReport::Skipped { day: -1, .. }));
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn single_failure_is_reported_not_raised() {
        let start = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let config = campaign(start, 14, &[("Alice", "alice@example.com")]);
        let (mailer, count) = MockMailer::failing_for(&["alice@example.com"]);

        let report = ReminderDispatcher::dispatch(Some(&config), Some(&mailer), noon(start)).await;

        match report {
            DispatchReport::Completed { sent, failed, results, .. } => {
                assert_eq!(sent, 0);
                assert_eq!(failed, 1);
                assert_eq!(results.len(), 1);
                assert_eq!(results[0].status, SendStatus::Failed);
                assert!(results[0].error.as_deref().unwrap().contains("mock delivery failure"));
            }
            other => panic!("expected Completed, got {other:?}"),
        }
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn one_failure_among_three_does_not_block_others() {
        let start = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let config = campaign(
            start,
            14,
            &[
                ("Alice", "alice@example.com"),
                ("Bob", "bob@example.com"),
                ("Carol", "carol@example.com"),
            ],
        );
        let (mailer, count) = MockMailer::failing_for(&["bob@example.com"]);

        let report = ReminderDispatcher::dispatch(Some(&config), Some(&mailer), noon(start)).await;

        match report {
            DispatchReport::Completed { day, sent, failed, results, .. } => {
                assert_eq!(day, 1);
                assert_eq!(sent, 2);
                assert_eq!(failed, 1);
                assert_eq!(results.len(), 3);
                // Order follows the tester list.
                assert_eq!(results[0].email, "alice@example.com");
                assert_eq!(results[0].status, SendStatus::Sent);
                assert_eq!(results[1].status, SendStatus::Failed);
                assert_eq!(results[2].status, SendStatus::Sent);
            }
            other => panic!("expected Completed, got {other:?}"),
        }
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn report_serializes_camel_case() {
        let start = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let config = campaign(start, 14, &[("Alice", "alice@example.com")]);
        let (mailer, _) = MockMailer::new();

        let report = ReminderDispatcher::dispatch(Some(&config), Some(&mailer), noon(start)).await;
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["outcome"], "completed");
        assert_eq!(json["totalDays"], 14);
        assert_eq!(json["results"][0]["status"], "sent");
        assert!(json["results"][0].get("error").is_none());
    }
}
