//! Error types for ProofPass operations.

use proofpass_core::DeadlineExceeded;
use thiserror::Error;

/// Result type alias for ProofPass operations.
pub type Result<T> = std::result::Result<T, ProofPassError>;

/// Error taxonomy shared by every ProofPass component.
///
/// Precondition failures (`Validation` through `RateLimited`) are detected
/// locally and are stable for the same input. Collaborator failures are
/// collapsed into `Internal`, and deadline expiry into `Cancelled`; neither is
/// retried inside the library.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProofPassError {
    // ═══════════════════════════════════════════════════════════
    // Input Errors
    // ═══════════════════════════════════════════════════════════

    /// Malformed or missing input field, or an unmet precondition.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Presented credential has the wrong type or context.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Requested credential context does not belong to the event.
    #[error("Invalid context: {0}")]
    InvalidContext(String),

    // ═══════════════════════════════════════════════════════════
    // Authentication Errors
    // ═══════════════════════════════════════════════════════════

    /// Wrong one-time code, wrong admin code, or caller lacks authority.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Session token has a bad signature, is malformed, or has expired.
    #[error("Invalid session token")]
    InvalidToken,

    // ═══════════════════════════════════════════════════════════
    // Resource Errors
    // ═══════════════════════════════════════════════════════════

    /// Event, user or registration absent.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Duplicate attendance, duplicate ticket credential, identity already set.
    #[error("Conflict: {0}")]
    Conflict(String),

    // ═══════════════════════════════════════════════════════════
    // Rate Limiting
    // ═══════════════════════════════════════════════════════════

    /// A verification code for this email is still pending.
    #[error("A verification code was already sent, wait for it to expire")]
    RateLimited,

    // ═══════════════════════════════════════════════════════════
    // System Errors
    // ═══════════════════════════════════════════════════════════

    /// A collaborator call did not finish before the request deadline.
    #[error("Operation `{operation}` cancelled: request deadline exceeded")]
    Cancelled {
        /// Collaborator call that was cut off.
        operation: &'static str,
    },

    /// Store, cache or RPC failure (should not be exposed to users).
    #[error("Internal error in `{operation}`: {message}")]
    Internal {
        /// Collaborator call that failed.
        operation: &'static str,
        /// Driver error, for logs only.
        message: String,
    },
}

impl ProofPassError {
    /// Wrap a collaborator failure.
    ///
    /// # Examples
    ///
    /// ```
    /// # use proofpass_auth::ProofPassError;
    /// let err = ProofPassError::internal("users.get", "connection reset");
    /// assert_eq!(err.to_string(), "Internal error in `users.get`: connection reset");
    /// ```
    #[must_use]
    pub fn internal(operation: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Internal {
            operation,
            message: err.to_string(),
        }
    }

    /// Returns `true` if this error is due to caller input rather than a
    /// collaborator failure.
    ///
    /// # Examples
    ///
    /// ```
    /// # use proofpass_auth::ProofPassError;
    /// assert!(ProofPassError::RateLimited.is_user_error());
    /// assert!(!ProofPassError::internal("otc.set", "timeout").is_user_error());
    /// ```
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        !matches!(self, Self::Internal { .. } | Self::Cancelled { .. })
    }
}

impl From<DeadlineExceeded> for ProofPassError {
    fn from(err: DeadlineExceeded) -> Self {
        Self::Cancelled {
            operation: err.operation,
        }
    }
}
