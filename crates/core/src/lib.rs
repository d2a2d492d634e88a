pub mod campaign;
pub mod clock;
pub mod error;

pub use campaign::{CampaignConfig, CampaignPayload, ReminderTime, Tester, TesterInput};
pub use error::CampaignError;
