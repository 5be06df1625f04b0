//! SMTP code notifier using Lettre.

use crate::error::{ProofPassError, Result};
use crate::providers::notifier::CodeNotifier;
use chrono::{DateTime, Utc};
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

const OPERATION: &str = "notifier.send_code";

/// Sends verification codes over SMTP.
///
/// # Examples
///
/// ```ignore
/// use proofpass_auth::providers::SmtpCodeNotifier;
///
/// let notifier = SmtpCodeNotifier::new(
///     "email-smtp.us-east-1.amazonaws.com".to_string(),
///     587,
///     "smtp-user".to_string(),
///     "smtp-password".to_string(),
///     "noreply@proofpass.io".to_string(),
///     "ProofPass".to_string(),
/// );
/// ```
#[derive(Clone)]
pub struct SmtpCodeNotifier {
    /// SMTP server address.
    smtp_server: String,

    /// SMTP server port.
    smtp_port: u16,

    /// SMTP credentials.
    credentials: Credentials,

    /// Sender email address.
    from_email: String,

    /// Sender display name.
    from_name: String,
}

impl SmtpCodeNotifier {
    /// Create a new SMTP notifier.
    #[must_use]
    pub fn new(
        smtp_server: String,
        smtp_port: u16,
        smtp_username: String,
        smtp_password: String,
        from_email: String,
        from_name: String,
    ) -> Self {
        Self {
            smtp_server,
            smtp_port,
            credentials: Credentials::new(smtp_username, smtp_password),
            from_email,
            from_name,
        }
    }

    /// Build SMTP transport for sending emails.
    fn build_transport(&self) -> Result<SmtpTransport> {
        Ok(SmtpTransport::relay(&self.smtp_server)
            .map_err(|e| ProofPassError::internal(OPERATION, format!("SMTP relay error: {e}")))?
            .port(self.smtp_port)
            .credentials(self.credentials.clone())
            .build())
    }

    /// Build the "From" header.
    fn from_header(&self) -> String {
        format!("{} <{}>", self.from_name, self.from_email)
    }

    /// Build the message carrying `code`.
    fn build_message(&self, to: &str, code: &str, expires_at: DateTime<Utc>) -> Result<Message> {
        let expires_seconds = (expires_at - Utc::now()).num_seconds().max(0);
        let body = format!(
            "Your ProofPass verification code is {code}.\n\n\
             It expires in {expires_seconds} seconds. \
             If you didn't request this code, you can safely ignore this email.\n"
        );

        Message::builder()
            .from(
                self.from_header()
                    .parse()
                    .map_err(|e| ProofPassError::internal(OPERATION, format!("Invalid from address: {e}")))?,
            )
            .to(to
                .parse()
                .map_err(|e| ProofPassError::internal(OPERATION, format!("Invalid to address: {e}")))?)
            .subject("Your ProofPass verification code")
            .header(ContentType::TEXT_PLAIN)
            .body(body)
            .map_err(|e| ProofPassError::internal(OPERATION, format!("Failed to build email: {e}")))
    }
}

impl CodeNotifier for SmtpCodeNotifier {
    async fn send_code(&self, to: &str, code: &str, expires_at: DateTime<Utc>) -> Result<()> {
        let email = self.build_message(to, code, expires_at)?;
        let mailer = self.build_transport()?;

        // Lettre's SmtpTransport is blocking
        tokio::task::spawn_blocking(move || {
            mailer
                .send(&email)
                .map_err(|e| ProofPassError::internal(OPERATION, format!("Failed to send email: {e}")))
        })
        .await
        .map_err(|e| ProofPassError::internal(OPERATION, format!("Email task failed: {e}")))?
        .map(|_| ())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    fn notifier() -> SmtpCodeNotifier {
        SmtpCodeNotifier::new(
            "localhost".to_string(),
            2525,
            "user".to_string(),
            "pass".to_string(),
            "noreply@proofpass.io".to_string(),
            "ProofPass".to_string(),
        )
    }

    #[test]
    fn test_message_builds_for_valid_recipient() {
        let message = notifier().build_message("a@b.com", "012345", Utc::now());
        assert!(message.is_ok());
    }

    #[test]
    fn test_message_rejects_invalid_recipient() {
        let message = notifier().build_message("not an address", "012345", Utc::now());
        assert!(matches!(message, Err(ProofPassError::Internal { .. })));
    }
}
