//! Mock credential issuer for testing.

use crate::error::{ProofPassError, Result};
use crate::providers::{CredentialIssuer, IssueRequest};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

#[derive(Debug, Clone, Copy, Default)]
enum Behavior {
    #[default]
    Sign,
    Fail,
    Stall(Duration),
}

/// Mock issuer.
///
/// Records every request and answers with `signed:{context}:{subject}`.
#[derive(Debug, Clone, Default)]
pub struct MockCredentialIssuer {
    requests: Arc<Mutex<Vec<IssueRequest>>>,
    behavior: Arc<Mutex<Behavior>>,
}

impl MockCredentialIssuer {
    /// Create a new mock issuer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every subsequent request.
    pub fn fail(&self) {
        *self.behavior.lock().unwrap_or_else(PoisonError::into_inner) = Behavior::Fail;
    }

    /// Delay every subsequent response by `delay`.
    pub fn stall(&self, delay: Duration) {
        *self.behavior.lock().unwrap_or_else(PoisonError::into_inner) = Behavior::Stall(delay);
    }

    /// Requests received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<IssueRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of requests received.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl CredentialIssuer for MockCredentialIssuer {
    async fn generate_signed_credential(&self, request: &IssueRequest) -> Result<String> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        let behavior = *self.behavior.lock().unwrap_or_else(PoisonError::into_inner);
        match behavior {
            Behavior::Sign => {}
            Behavior::Fail => {
                return Err(ProofPassError::internal(
                    "issuer.generate_signed_credential",
                    "issuer returned 503",
                ));
            }
            Behavior::Stall(delay) => tokio::time::sleep(delay).await,
        }

        Ok(format!(
            "signed:{}:{}",
            request.header.context, request.header.id
        ))
    }
}
