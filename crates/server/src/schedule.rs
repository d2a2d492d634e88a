//! Daily reminder trigger.
//!
//! One recurring trigger at most. `install` derives a 6-field cron
//! expression from the campaign's `HH:MM` reminder time, evaluates it in
//! the campaign's IANA timezone, and spawns a task that sleeps until each
//! fire instant and then runs a dispatch pass against the live state.
//! The callback reads the store at fire time, so a reconfigure between
//! fires takes effect without reinstalling.

use std::str::FromStr;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use chrono_tz::Tz;
use cron::Schedule;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use nudge_core::ReminderTime;
use nudge_notify::DispatchReport;

use crate::state::AppState;

/// Owns the single recurring trigger task.
pub struct ScheduleController {
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl ScheduleController {
    pub fn new() -> Self {
        Self {
            handle: Mutex::new(None),
        }
    }

    /// Install the daily trigger, tearing down any existing one first.
    pub fn install(
        &self,
        time: ReminderTime,
        timezone: &str,
        state: Arc<AppState>,
    ) -> anyhow::Result<()> {
        let tz: Tz = timezone
            .parse()
            .map_err(|_| anyhow::anyhow!("unknown timezone: {timezone}"))?;
        let expr = daily_cron_expr(time);
        let schedule = Schedule::from_str(&expr)?;

        self.uninstall();
        info!(cron = %expr, timezone = %tz, "installing daily reminder trigger");
        let task = tokio::spawn(run_trigger_loop(schedule, tz, state));
        *self.handle.lock().expect("schedule lock poisoned") = Some(task);
        Ok(())
    }

    /// Cancel the trigger if one is installed. No-op otherwise.
    pub fn uninstall(&self) {
        if let Some(task) = self.handle.lock().expect("schedule lock poisoned").take() {
            task.abort();
            info!("daily reminder trigger removed");
        }
    }

    pub fn is_installed(&self) -> bool {
        self.handle
            .lock()
            .expect("schedule lock poisoned")
            .is_some()
    }
}

impl Default for ScheduleController {
    fn default() -> Self {
        Self::new()
    }
}

/// 6-field cron expression (`sec min hour dom month dow`) firing once a day.
fn daily_cron_expr(time: ReminderTime) -> String {
    format!("0 {} {} * * *", time.minute, time.hour)
}

async fn run_trigger_loop(schedule: Schedule, tz: Tz, state: Arc<AppState>) {
    loop {
        let now = Utc::now().with_timezone(&tz);
        let Some(next) = schedule.after(&now).next() else {
            warn!("cron schedule produced no upcoming fire time, stopping trigger task");
            return;
        };
        let wait = (next - now).to_std().unwrap_or_default();
        info!(next = %next, "next reminder dispatch scheduled");
        tokio::time::sleep(wait).await;

        match state.run_dispatch_pass().await {
            DispatchReport::Completed { day, sent, failed, .. } => {
                info!(day, sent, failed, "scheduled dispatch complete");
            }
            DispatchReport::Skipped { day, total_days } => {
                info!(day, total_days, "scheduled dispatch skipped, outside window");
            }
            DispatchReport::NotConfigured => {
                warn!("scheduled dispatch fired with no active campaign");
            }
        }
    }
}
