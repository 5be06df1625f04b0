//! Mock code notifier for testing.

use crate::error::{ProofPassError, Result};
use crate::providers::CodeNotifier;
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// A delivered verification code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentCode {
    /// Recipient.
    pub to: String,
    /// Code.
    pub code: String,
    /// Expiry announced to the recipient.
    pub expires_at: DateTime<Utc>,
}

/// Mock notifier.
///
/// Records every delivered code so tests can read it back, and can be switched
/// into a failing or stalling mode to exercise the delivery-failure paths.
#[derive(Debug, Clone, Default)]
pub struct MockCodeNotifier {
    sent: Arc<Mutex<Vec<SentCode>>>,
    failing: Arc<Mutex<bool>>,
    stall: Arc<Mutex<Option<Duration>>>,
}

impl MockCodeNotifier {
    /// Create a new mock notifier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent delivery fail.
    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock().unwrap_or_else(PoisonError::into_inner) = failing;
    }

    /// Hold every subsequent delivery for `stall` before completing it.
    pub fn set_stall(&self, stall: Option<Duration>) {
        *self.stall.lock().unwrap_or_else(PoisonError::into_inner) = stall;
    }

    /// All delivered codes, oldest first.
    #[must_use]
    pub fn sent(&self) -> Vec<SentCode> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The most recent code delivered to `email`.
    #[must_use]
    pub fn last_code_for(&self, email: &str) -> Option<String> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .rev()
            .find(|sent| sent.to == email)
            .map(|sent| sent.code.clone())
    }
}

impl CodeNotifier for MockCodeNotifier {
    async fn send_code(&self, to: &str, code: &str, expires_at: DateTime<Utc>) -> Result<()> {
        let stall = *self.stall.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(stall) = stall {
            tokio::time::sleep(stall).await;
        }
        if *self.failing.lock().unwrap_or_else(PoisonError::into_inner) {
            return Err(ProofPassError::internal("notifier.send_code", "mail relay refused"));
        }

        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(SentCode {
                to: to.to_string(),
                code: code.to_string(),
                expires_at,
            });
        Ok(())
    }
}
