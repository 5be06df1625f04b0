//! Session tokens.
//!
//! HS256-signed JWTs carrying `{sub, email, iat, exp}`. There is no server-side
//! session store: a token is valid until its `exp`, and expiry is checked
//! against the injected clock.

use crate::config::SessionConfig;
use crate::error::{ProofPassError, Result};
use crate::state::UserId;
use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use proofpass_core::Clock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Claims embedded in a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (user id).
    pub sub: String,
    /// User's email.
    pub email: String,
    /// Issued at (unix seconds).
    pub iat: i64,
    /// Expires at (unix seconds).
    pub exp: i64,
}

impl SessionClaims {
    /// The subject as a [`UserId`].
    ///
    /// # Errors
    ///
    /// Returns `InvalidToken` if the subject is not a UUID.
    pub fn user_id(&self) -> Result<UserId> {
        Uuid::parse_str(&self.sub)
            .map(UserId)
            .map_err(|_| ProofPassError::InvalidToken)
    }
}

/// A freshly issued token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssuedToken {
    /// Encoded JWT.
    pub token: String,
    /// Expiry.
    pub expires_at: DateTime<Utc>,
}

/// Issues and validates session tokens.
#[derive(Clone)]
pub struct SessionTokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: chrono::Duration,
    clock: Arc<dyn Clock>,
}

impl SessionTokenIssuer {
    /// Create an issuer.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if the secret is shorter than
    /// [`SessionConfig::MIN_SECRET_LENGTH`] bytes or the lifetime is not positive.
    pub fn new(config: &SessionConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        if config.secret.len() < SessionConfig::MIN_SECRET_LENGTH {
            return Err(ProofPassError::Validation(format!(
                "session secret must be at least {} bytes",
                SessionConfig::MIN_SECRET_LENGTH
            )));
        }
        if config.ttl <= chrono::Duration::zero() {
            return Err(ProofPassError::Validation(
                "session lifetime must be positive".to_string(),
            ));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against the injected clock
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            ttl: config.ttl,
            clock,
        })
    }

    /// Issue a token for `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `Internal` if signing fails.
    pub fn issue(&self, user_id: UserId, email: &str) -> Result<IssuedToken> {
        let issued_at = self.clock.now();
        let expires_at = issued_at + self.ttl;
        let claims = SessionClaims {
            sub: user_id.to_string(),
            email: email.to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| ProofPassError::internal("session.issue", e))?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Validate a token and return its claims.
    ///
    /// # Errors
    ///
    /// Returns `InvalidToken` on a bad signature, malformed structure or an
    /// expiry that is not in the future.
    pub fn validate(&self, token: &str) -> Result<SessionClaims> {
        let data = decode::<SessionClaims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            tracing::debug!(error = %e, "Session token rejected");
            ProofPassError::InvalidToken
        })?;

        if data.claims.exp <= self.clock.now().timestamp() {
            tracing::debug!(sub = %data.claims.sub, "Session token expired");
            return Err(ProofPassError::InvalidToken);
        }

        Ok(data.claims)
    }
}
