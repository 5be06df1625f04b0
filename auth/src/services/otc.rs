//! One-time code authentication.
//!
//! ```text
//! request_code(email):  SET proofpass:otc:{email} <code> NX EX 60 ──► notify
//!                       (taken → RateLimited)
//! redeem_code(email):   GETDEL proofpass:otc:{email} ──► compare
//!                       (absent or mismatch → Unauthorized, code consumed)
//! ```

use crate::config::OtcConfig;
use crate::constants::{OTC_KEY_PREFIX, metrics as metric_names};
use crate::error::{ProofPassError, Result};
use crate::providers::{CodeNotifier, OtcStore};
use crate::utils::{generate_numeric_code, require_non_empty, validate_email};
use chrono::{DateTime, Utc};
use proofpass_core::{Clock, RequestContext};
use std::sync::Arc;
use std::time::Duration;

/// Budget for withdrawing an undelivered code, independent of the request deadline.
const WITHDRAW_TIMEOUT: Duration = Duration::from_secs(2);

/// Issues and redeems email verification codes.
#[derive(Clone)]
pub struct OtcAuthenticator<S, N> {
    store: S,
    notifier: N,
    clock: Arc<dyn Clock>,
    config: OtcConfig,
}

impl<S, N> OtcAuthenticator<S, N>
where
    S: OtcStore,
    N: CodeNotifier,
{
    /// Create an authenticator.
    #[must_use]
    pub fn new(store: S, notifier: N, clock: Arc<dyn Clock>, config: OtcConfig) -> Self {
        Self {
            store,
            notifier,
            clock,
            config,
        }
    }

    /// Cache key holding the pending code of `email`.
    #[must_use]
    pub fn key_for(email: &str) -> String {
        format!("{OTC_KEY_PREFIX}{email}")
    }

    /// Issue a code for `email` and deliver it.
    ///
    /// # Returns
    ///
    /// When the code stops being redeemable.
    ///
    /// # Errors
    ///
    /// - `Validation` if the email is malformed
    /// - `RateLimited` if a code for this email is still pending
    /// - `Internal` if storing or delivering fails; a code that could not be
    ///   delivered is withdrawn
    #[tracing::instrument(
        skip_all,
        name = "otc.request_code",
        fields(correlation_id = %ctx.correlation_id())
    )]
    pub async fn request_code(&self, ctx: &RequestContext, email: &str) -> Result<DateTime<Utc>> {
        let email = validate_email(email)?;
        let key = Self::key_for(&email);
        let code = generate_numeric_code(self.config.code_length);
        let ttl = chrono::Duration::from_std(self.config.ttl)
            .map_err(|e| ProofPassError::internal("otc.ttl", e))?;
        let expires_at = self.clock.now() + ttl;

        let stored = ctx
            .run(
                "otc_store.set_if_absent",
                self.store.set_if_absent(&key, &code, self.config.ttl),
            )
            .await?;

        if !stored {
            tracing::info!(email = %email, "Verification code already pending");
            return Err(ProofPassError::RateLimited);
        }

        if let Err(error) = ctx
            .run(
                "notifier.send_code",
                self.notifier.send_code(&email, &code, expires_at),
            )
            .await
        {
            tracing::error!(email = %email, error = %error, "Failed to deliver verification code");
            let cleanup_ctx = RequestContext::new(ctx.correlation_id(), WITHDRAW_TIMEOUT);
            if let Err(cleanup) = cleanup_ctx
                .run("otc_store.delete", self.store.delete(&key))
                .await
            {
                tracing::warn!(email = %email, error = %cleanup, "Failed to withdraw undelivered code");
            }
            return Err(error);
        }

        metrics::counter!(metric_names::OTC_ISSUED).increment(1);
        tracing::info!(email = %email, expires_at = %expires_at, "Verification code issued");

        Ok(expires_at)
    }

    /// Redeem a code for `email`.
    ///
    /// The pending code is consumed whether or not `submitted` matches.
    ///
    /// # Returns
    ///
    /// The normalized email.
    ///
    /// # Errors
    ///
    /// - `Validation` if the email or code is missing or malformed
    /// - `Unauthorized` if no code is pending or it does not match
    /// - `Internal` if the store fails
    #[tracing::instrument(
        skip_all,
        name = "otc.redeem_code",
        fields(correlation_id = %ctx.correlation_id())
    )]
    pub async fn redeem_code(&self, ctx: &RequestContext, email: &str, submitted: &str) -> Result<String> {
        let email = validate_email(email)?;
        require_non_empty("code", submitted)?;

        let stored = ctx
            .run(
                "otc_store.get_and_delete",
                self.store.get_and_delete(&Self::key_for(&email)),
            )
            .await?;

        let matches = stored.as_deref().is_some_and(|code| {
            constant_time_eq::constant_time_eq(code.as_bytes(), submitted.trim().as_bytes())
        });

        if !matches {
            tracing::info!(email = %email, pending = stored.is_some(), "Verification code rejected");
            return Err(ProofPassError::Unauthorized(
                "invalid or expired verification code".to_string(),
            ));
        }

        Ok(email)
    }

    /// Whether a code for `email` is pending.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a malformed email or `Internal` if the store fails.
    pub async fn has_pending_code(&self, ctx: &RequestContext, email: &str) -> Result<bool> {
        let email = validate_email(email)?;
        ctx.run("otc_store.exists", self.store.exists(&Self::key_for(&email)))
            .await
    }
}
