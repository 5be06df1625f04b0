//! Code delivery selected at startup.

use crate::config::SmtpConfig;
use chrono::{DateTime, Utc};
use proofpass_auth::Result;
use proofpass_auth::providers::{CodeNotifier, ConsoleCodeNotifier, SmtpCodeNotifier};

/// Console delivery in development, SMTP when login email is enabled.
#[derive(Clone)]
pub enum LoginNotifier {
    /// Log the code.
    Console(ConsoleCodeNotifier),
    /// Email the code.
    Smtp(SmtpCodeNotifier),
}

impl LoginNotifier {
    /// Build the notifier for the given SMTP settings.
    #[must_use]
    pub fn from_config(smtp: Option<&SmtpConfig>) -> Self {
        match smtp {
            Some(smtp) => Self::Smtp(SmtpCodeNotifier::new(
                smtp.host.clone(),
                smtp.port,
                smtp.username.clone(),
                smtp.password.clone(),
                smtp.from_email.clone(),
                smtp.from_name.clone(),
            )),
            None => Self::Console(ConsoleCodeNotifier),
        }
    }

    /// Delivery channel name, for startup logs.
    #[must_use]
    pub const fn channel(&self) -> &'static str {
        match self {
            Self::Console(_) => "console",
            Self::Smtp(_) => "smtp",
        }
    }
}

impl CodeNotifier for LoginNotifier {
    async fn send_code(&self, to: &str, code: &str, expires_at: DateTime<Utc>) -> Result<()> {
        match self {
            Self::Console(notifier) => notifier.send_code(to, code, expires_at).await,
            Self::Smtp(notifier) => notifier.send_code(to, code, expires_at).await,
        }
    }
}
