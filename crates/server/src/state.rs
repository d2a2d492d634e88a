//! Shared application state.
//!
//! The campaign lives in an explicit single-slot container rather than a
//! module-level global so tests can run isolated configurations side by
//! side. A dispatch pass snapshots the `Arc`s it needs up front; a
//! concurrent reconfigure or stop swaps the slots without tearing state
//! out from under a pass already in flight.

use std::sync::Arc;

use chrono::Local;
use tokio::sync::RwLock;

use nudge_core::CampaignConfig;
use nudge_notify::{DispatchReport, Mailer, NotifyError, ReminderDispatcher, SmtpMailer};

use crate::schedule::ScheduleController;

/// Process-lifetime holder for the single active campaign.
pub struct CampaignStore {
    slot: RwLock<Option<Arc<CampaignConfig>>>,
}

impl CampaignStore {
    pub fn new() -> Self {
        Self {
            slot: RwLock::new(None),
        }
    }

    pub async fn current(&self) -> Option<Arc<CampaignConfig>> {
        self.slot.read().await.clone()
    }

    /// Replace the active campaign wholesale.
    pub async fn replace(&self, config: Arc<CampaignConfig>) {
        *self.slot.write().await = Some(config);
    }

    /// Discard the active campaign. No history is retained.
    pub async fn clear(&self) {
        *self.slot.write().await = None;
    }
}

impl Default for CampaignStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds the mail transport for a freshly validated campaign. A trait so
/// tests can hand the server a mock transport.
pub trait MailerFactory: Send + Sync {
    fn build(&self, config: &CampaignConfig) -> Result<Arc<dyn Mailer>, NotifyError>;
}

/// Production factory: SMTP via the campaign's sender fields.
pub struct SmtpMailerFactory;

impl MailerFactory for SmtpMailerFactory {
    fn build(&self, config: &CampaignConfig) -> Result<Arc<dyn Mailer>, NotifyError> {
        Ok(Arc::new(SmtpMailer::from_campaign(config)?))
    }
}

pub struct AppState {
    pub campaign: CampaignStore,
    /// Transport built at configure time, cleared on stop.
    pub mailer: RwLock<Option<Arc<dyn Mailer>>>,
    pub mailer_factory: Arc<dyn MailerFactory>,
    pub schedule: ScheduleController,
    /// Shared secret guarding `GET /trigger`.
    pub api_secret: Option<String>,
}

impl AppState {
    pub fn new(mailer_factory: Arc<dyn MailerFactory>, api_secret: Option<String>) -> Self {
        Self {
            campaign: CampaignStore::new(),
            mailer: RwLock::new(None),
            mailer_factory,
            schedule: ScheduleController::new(),
            api_secret,
        }
    }

    /// Run one dispatch pass against whatever is configured right now.
    ///
    /// Manual and scheduled invocations both land here; they are not
    /// mutually excluded, so two passes on the same eligible day send
    /// duplicate reminders. Known behavior, kept as-is.
    pub async fn run_dispatch_pass(&self) -> DispatchReport {
        let config = self.campaign.current().await;
        let mailer = self.mailer.read().await.clone();
        ReminderDispatcher::dispatch(
            config.as_deref(),
            mailer.as_deref(),
            Local::now().naive_local(),
        )
        .await
    }
}
