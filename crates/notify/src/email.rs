//! SMTP mailer via `lettre`.
//!
//! Built from the campaign's sender fields. The `mailService` value is
//! either a well-known provider name (mapped to its SMTP relay host) or a
//! literal SMTP hostname. STARTTLS on port 587 throughout.

use lettre::{
    message::Mailbox, transport::smtp::authentication::Credentials, AsyncSmtpTransport,
    AsyncTransport, Message, Tokio1Executor,
};

use nudge_core::CampaignConfig;

use crate::traits::{Mailer, NotifyError, OutgoingEmail};

const SMTP_PORT: u16 = 587;

/// Sends reminders through an SMTP relay.
#[derive(Debug)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    /// Build a mailer from the campaign's sender address, credential, and
    /// mail service. The sender address doubles as the SMTP username.
    pub fn from_campaign(config: &CampaignConfig) -> Result<Self, NotifyError> {
        Self::new(
            &config.sender_address,
            &config.sender_credential,
            &config.mail_service,
        )
    }

    pub fn new(
        sender_address: &str,
        sender_credential: &str,
        mail_service: &str,
    ) -> Result<Self, NotifyError> {
        let from: Mailbox = sender_address
            .parse()
            .map_err(|e: lettre::address::AddressError| NotifyError::Config(e.to_string()))?;

        let host = relay_host(mail_service);
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
            .map_err(|e| NotifyError::Config(e.to_string()))?
            .port(SMTP_PORT)
            .credentials(Credentials::new(
                sender_address.to_string(),
                sender_credential.to_string(),
            ))
            .build();

        Ok(Self { transport, from })
    }
}

/// Map a provider name to its SMTP relay host. Unrecognized values are
/// treated as literal hostnames; an empty value falls back to gmail.
fn relay_host(mail_service: &str) -> &str {
    match mail_service.trim().to_ascii_lowercase().as_str() {
        "" | "gmail" => "smtp.gmail.com",
        "outlook" | "hotmail" => "smtp-mail.outlook.com",
        "yahoo" => "smtp.mail.yahoo.com",
        "sendgrid" => "smtp.sendgrid.net",
        "mailgun" => "smtp.mailgun.org",
        "zoho" => "smtp.zoho.com",
        _ => mail_service.trim(),
    }
}

#[async_trait::async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, mail: &OutgoingEmail) -> Result<(), NotifyError> {
        let to: Mailbox = mail
            .to
            .parse()
            .map_err(|e: lettre::address::AddressError| NotifyError::Smtp(e.to_string()))?;

        let email = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(&mail.subject)
            .body(mail.body.clone())
            .map_err(|e| NotifyError::Smtp(e.to_string()))?;

        self.transport
            .send(email)
            .await
            .map_err(|e| NotifyError::Smtp(e.to_string()))?;

        tracing::info!(
            transport = "smtp",
            to = %mail.to,
            subject = %mail.subject,
            "message delivered"
        );

        Ok(())
    }

    /// Open a connection to the relay and close it again.
    async fn verify(&self) -> Result<(), NotifyError> {
        let ok = self
            .transport
            .test_connection()
            .await
            .map_err(|e| NotifyError::Smtp(e.to_string()))?;
        if !ok {
            return Err(NotifyError::Smtp(
                "SMTP server rejected the connection".to_string(),
            ));
        }
        Ok(())
    }

    fn transport_name(&self) -> &str {
        "smtp"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relay_host_known_services() {
        assert_eq!(relay_host("gmail"), "smtp.gmail.com");
        assert_eq!(relay_host("GMAIL"), "smtp.gmail.com");
        assert_eq!(relay_host("outlook"), "smtp-mail.outlook.com");
        assert_eq!(relay_host("hotmail"), "smtp-mail.outlook.com");
        assert_eq!(relay_host("yahoo"), "smtp.mail.yahoo.com");
        assert_eq!(relay_host("sendgrid"), "smtp.sendgrid.net");
    }

    #[test]
    fn relay_host_empty_defaults_to_gmail() {
        assert_eq!(relay_host(""), "smtp.gmail.com");
        assert_eq!(relay_host("  "), "smtp.gmail.com");
    }

    #[test]
    fn relay_host_passes_through_literal_hosts() {
        assert_eq!(relay_host("mail.internal.example.com"), "mail.internal.example.com");
    }

    #[test]
    fn new_with_valid_sender() {
        let mailer = SmtpMailer::new("team@example.com", "app-password", "gmail");
        assert!(mailer.is_ok());
        assert_eq!(mailer.unwrap().transport_name(), "smtp");
    }

    #[test]
    fn new_with_invalid_sender_address() {
        let result = SmtpMailer::new("not-an-address", "pw", "gmail");
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("Configuration error"), "got: {err}");
    }

    #[test]
    fn sender_with_display_name_accepted() {
        let mailer = SmtpMailer::new("Orbit Team <team@example.com>", "pw", "gmail");
        assert!(mailer.is_ok());
    }
}
