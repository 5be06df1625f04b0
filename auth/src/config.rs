//! Service configuration.
//!
//! Values are supplied by the application (see the server's environment
//! loading); the defaults below are what the hosted service runs with.

use crate::constants::{
    CREDENTIAL_PROTOCOL_VERSION, DEFAULT_CHAIN_ID, DEFAULT_EMAIL_CREDENTIAL_CONTEXT_ID,
    DEFAULT_ISSUER_KEY_ID,
};
use chrono::Duration;

/// One-time code configuration.
#[derive(Debug, Clone)]
pub struct OtcConfig {
    /// How long a code stays redeemable.
    ///
    /// Default: 60 seconds
    pub ttl: std::time::Duration,

    /// Number of decimal digits.
    ///
    /// Default: 6
    pub code_length: usize,
}

impl OtcConfig {
    /// Create one-time code configuration with the defaults.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ttl: std::time::Duration::from_secs(60),
            code_length: 6,
        }
    }

    /// Set code time-to-live.
    #[must_use]
    pub const fn with_ttl(mut self, ttl: std::time::Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set number of digits.
    #[must_use]
    pub const fn with_code_length(mut self, digits: usize) -> Self {
        self.code_length = digits;
        self
    }
}

impl Default for OtcConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Session token configuration.
#[derive(Clone)]
pub struct SessionConfig {
    /// HMAC secret (at least 32 bytes).
    pub secret: String,

    /// Token lifetime.
    ///
    /// Default: 24 hours
    pub ttl: Duration,
}

impl SessionConfig {
    /// Minimum secret length in bytes.
    pub const MIN_SECRET_LENGTH: usize = 32;

    /// Create session configuration.
    ///
    /// # Arguments
    ///
    /// * `secret` - HMAC secret, validated when the issuer is built
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ttl: Duration::hours(24),
        }
    }

    /// Set token lifetime.
    #[must_use]
    pub const fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("secret", &"<redacted>")
            .field("ttl", &self.ttl)
            .finish()
    }
}

/// Credential issuance configuration.
#[derive(Debug, Clone)]
pub struct CredentialConfig {
    /// Chain id passed to the issuer.
    pub chain_id: String,

    /// Context of email credentials.
    ///
    /// Default: "111"
    pub email_context_id: String,

    /// Credential protocol version.
    ///
    /// Default: 1
    pub protocol_version: u32,

    /// Validity window of ticket credentials.
    ///
    /// Default: 265 days
    pub ticket_validity: Duration,

    /// Validity window of email credentials.
    ///
    /// Default: 14 days
    pub email_validity: Duration,
}

impl CredentialConfig {
    /// Create credential configuration for the given issuer chain.
    #[must_use]
    pub fn new(chain_id: impl Into<String>) -> Self {
        Self {
            chain_id: chain_id.into(),
            email_context_id: DEFAULT_EMAIL_CREDENTIAL_CONTEXT_ID.to_string(),
            protocol_version: CREDENTIAL_PROTOCOL_VERSION,
            ticket_validity: Duration::days(265),
            email_validity: Duration::days(14),
        }
    }

    /// Set the email credential context.
    #[must_use]
    pub fn with_email_context_id(mut self, context_id: impl Into<String>) -> Self {
        self.email_context_id = context_id.into();
        self
    }

    /// Set ticket credential validity.
    #[must_use]
    pub const fn with_ticket_validity(mut self, validity: Duration) -> Self {
        self.ticket_validity = validity;
        self
    }

    /// Set email credential validity.
    #[must_use]
    pub const fn with_email_validity(mut self, validity: Duration) -> Self {
        self.email_validity = validity;
        self
    }
}

impl Default for CredentialConfig {
    fn default() -> Self {
        Self::new(DEFAULT_CHAIN_ID)
    }
}

/// Event configuration.
#[derive(Debug, Clone)]
pub struct EventConfig {
    /// Chain id recorded on new events.
    pub chain_id: String,

    /// Issuer key recorded on new events.
    pub issuer_key_id: String,
}

impl EventConfig {
    /// Create event configuration.
    #[must_use]
    pub fn new(chain_id: impl Into<String>, issuer_key_id: impl Into<String>) -> Self {
        Self {
            chain_id: chain_id.into(),
            issuer_key_id: issuer_key_id.into(),
        }
    }
}

impl Default for EventConfig {
    fn default() -> Self {
        Self::new(DEFAULT_CHAIN_ID, DEFAULT_ISSUER_KEY_ID)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        assert_eq!(OtcConfig::default().ttl.as_secs(), 60);
        assert_eq!(OtcConfig::default().code_length, 6);

        let credentials = CredentialConfig::default();
        assert_eq!(credentials.email_context_id, "111");
        assert_eq!(credentials.ticket_validity, Duration::days(265));
        assert_eq!(credentials.email_validity, Duration::days(14));
    }

    #[test]
    fn test_session_config_debug_redacts_secret() {
        let config = SessionConfig::new("a-very-long-secret-that-must-not-leak");
        assert!(!format!("{config:?}").contains("must-not-leak"));
    }
}
