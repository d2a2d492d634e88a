//! Reminder delivery for tester campaigns.
//!
//! This crate provides:
//! - `Mailer` trait for the outbound mail capability
//! - SMTP mailer implementation via `lettre`
//! - Minijinja rendering of the daily reminder message
//! - Dispatcher that runs one pass over the tester list

pub mod dispatcher;
pub mod email;
pub mod templating;
pub mod traits;

pub use dispatcher::{DispatchReport, ReminderDispatcher, SendStatus, TesterOutcome};
pub use email::SmtpMailer;
pub use templating::{ReminderRenderer, RenderedReminder};
pub use traits::{Mailer, NotifyError, OutgoingEmail};
