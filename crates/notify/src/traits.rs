//! Mailer trait definition and shared error types.

/// Errors that can occur while building or using the mail transport.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("SMTP delivery failed: {0}")]
    Smtp(String),

    #[error("Template rendering failed: {0}")]
    Template(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// A rendered message ready for delivery to a single recipient.
#[derive(Debug, Clone, serde::Serialize)]
pub struct OutgoingEmail {
    /// Recipient address.
    pub to: String,
    /// The rendered subject line.
    pub subject: String,
    /// The rendered plain-text body.
    pub body: String,
}

/// Outbound mail capability.
///
/// One implementation per transport; the dispatcher and the HTTP handlers
/// only ever see this trait, so tests swap in mocks.
#[async_trait::async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver one message. No retries; the caller records the outcome.
    async fn send(&self, mail: &OutgoingEmail) -> Result<(), NotifyError>;

    /// Probe transport connectivity without sending anything.
    async fn verify(&self) -> Result<(), NotifyError>;

    /// Human-readable name for this transport (e.g., "smtp").
    fn transport_name(&self) -> &str;
}
