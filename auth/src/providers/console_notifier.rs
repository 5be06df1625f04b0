//! Console code notifier for development.

use crate::error::Result;
use crate::providers::notifier::CodeNotifier;
use chrono::{DateTime, Utc};
use tracing::info;

/// Logs verification codes instead of emailing them.
///
/// Used when login email is disabled (`ENABLE_LOGIN_EMAIL=false`).
#[derive(Clone, Debug, Default)]
pub struct ConsoleCodeNotifier;

impl ConsoleCodeNotifier {
    /// Create a new console notifier.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl CodeNotifier for ConsoleCodeNotifier {
    async fn send_code(&self, to: &str, code: &str, expires_at: DateTime<Utc>) -> Result<()> {
        info!(
            to = %to,
            code = %code,
            expires_at = %expires_at,
            "Verification code (development mode, not emailed)"
        );
        Ok(())
    }
}
