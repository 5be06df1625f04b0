//! Credential orchestration.
//!
//! Builds ticket and email credential requests, submits them once to the
//! issuer and stamps the result with issuance and expiry times taken from the
//! server clock. The issuer's own timestamps are never trusted.

use crate::config::CredentialConfig;
use crate::constants::metrics as metric_names;
use crate::error::{ProofPassError, Result};
use crate::providers::{
    CredentialBody, CredentialHeader, CredentialIssuer, CredentialType, EventRepository,
    IssueRequest, RegistrationRepository, TicketCredentialRepository, UserRepository,
};
use crate::services::context::bind_context;
use crate::state::{CredentialKind, EventId, IssuedCredential, User, UserId};
use crate::utils::subject_id;
use chrono::{DateTime, Utc};
use proofpass_core::{Clock, RequestContext};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Assembles and submits credential-issuance requests.
#[derive(Clone)]
pub struct CredentialOrchestrator<D, I> {
    db: D,
    issuer: I,
    clock: Arc<dyn Clock>,
    config: CredentialConfig,
}

impl<D, I> CredentialOrchestrator<D, I>
where
    D: UserRepository + EventRepository + RegistrationRepository + TicketCredentialRepository,
    I: CredentialIssuer,
{
    /// Create an orchestrator.
    #[must_use]
    pub fn new(db: D, issuer: I, clock: Arc<dyn Clock>, config: CredentialConfig) -> Self {
        Self {
            db,
            issuer,
            clock,
            config,
        }
    }

    /// Request a ticket credential for `event_id`.
    ///
    /// Preconditions, checked in order before the issuer is contacted:
    ///
    /// 1. the user exists, else `NotFound`
    /// 2. no ticket credential is stored for `(event, email)`, else `Conflict`
    /// 3. a registration exists for `(event, email)`, else `Validation`
    /// 4. the identity commitment is set, else `Validation`
    /// 5. the event exists, else `NotFound`
    /// 6. the event has a context, else `Validation`; a `requested_context`
    ///    that differs from it fails with `InvalidContext`
    ///
    /// # Errors
    ///
    /// The failures above, and `Internal`/`Cancelled` from any collaborator.
    #[tracing::instrument(
        skip_all,
        name = "credentials.request_ticket",
        fields(correlation_id = %ctx.correlation_id(), user_id = %user_id, event_id = %event_id)
    )]
    pub async fn request_ticket_credential(
        &self,
        ctx: &RequestContext,
        user_id: UserId,
        event_id: EventId,
        requested_context: Option<&str>,
    ) -> Result<IssuedCredential> {
        let user = self.load_user(ctx, user_id).await?;

        let already_issued = ctx
            .run(
                "ticket_credentials.exists",
                self.db.ticket_credential_exists(event_id, &user.email),
            )
            .await?;
        if already_issued {
            return Err(ProofPassError::Conflict(
                "ticket credential already issued".to_string(),
            ));
        }

        let registered = ctx
            .run(
                "registrations.exists",
                self.db.is_registered(event_id, &user.email),
            )
            .await?;
        if !registered {
            tracing::info!(email = %user.email, "No registration for event");
            return Err(ProofPassError::Validation(
                "not registered for this event".to_string(),
            ));
        }

        require_commitment(&user)?;

        let event = ctx
            .run("events.get", self.db.get_event(event_id))
            .await?
            .ok_or(ProofPassError::NotFound("event"))?;

        let context = bind_context(&event, requested_context)?;

        let issued_at = self.clock.now();
        let expire_at = issued_at + self.config.ticket_validity;
        let request = self.build_request(
            &user,
            context.into_inner(),
            BTreeMap::from([("event_id".to_string(), event_id.to_string())]),
            expire_at,
        );

        self.issue(ctx, &request, "ticket", issued_at, expire_at).await
    }

    /// Request an email credential bound to the configured email context.
    ///
    /// There is no duplicate-issuance guard: repeat calls sign again.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown user, `Validation` if the identity commitment
    /// is not set, and `Internal`/`Cancelled` from any collaborator.
    #[tracing::instrument(
        skip_all,
        name = "credentials.request_email",
        fields(correlation_id = %ctx.correlation_id(), user_id = %user_id)
    )]
    pub async fn request_email_credential(
        &self,
        ctx: &RequestContext,
        user_id: UserId,
    ) -> Result<IssuedCredential> {
        let user = self.load_user(ctx, user_id).await?;
        require_commitment(&user)?;

        let issued_at = self.clock.now();
        let expire_at = issued_at + self.config.email_validity;
        let request = self.build_request(
            &user,
            self.config.email_context_id.clone(),
            BTreeMap::from([("email".to_string(), user.email.clone())]),
            expire_at,
        );

        self.issue(ctx, &request, "email", issued_at, expire_at).await
    }

    async fn load_user(&self, ctx: &RequestContext, user_id: UserId) -> Result<User> {
        ctx.run("users.get", self.db.get_user(user_id))
            .await?
            .ok_or(ProofPassError::NotFound("user"))
    }

    fn build_request(
        &self,
        user: &User,
        context: String,
        attachments: BTreeMap<String, String>,
        expire_at: DateTime<Utc>,
    ) -> IssueRequest {
        let kind = CredentialKind::Unit;
        IssueRequest {
            header: CredentialHeader {
                version: self.config.protocol_version,
                type_id: kind.type_id().to_string(),
                context,
                id: subject_id(&user.email),
            },
            body: CredentialBody {
                tp: CredentialType {
                    type_id: kind.type_id().to_string(),
                    revocable: 0,
                },
            },
            attachments,
            chain_id: self.config.chain_id.clone(),
            identity_commitment: user.identity_commitment.clone(),
            expired_at: expire_at,
        }
    }

    async fn issue(
        &self,
        ctx: &RequestContext,
        request: &IssueRequest,
        kind: &'static str,
        issued_at: DateTime<Utc>,
        expire_at: DateTime<Utc>,
    ) -> Result<IssuedCredential> {
        let credential = ctx
            .run(
                "issuer.generate_signed_credential",
                self.issuer.generate_signed_credential(request),
            )
            .await?;

        metrics::counter!(metric_names::CREDENTIALS_ISSUED, "kind" => kind).increment(1);
        tracing::info!(
            kind = kind,
            context = %request.header.context,
            expire_at = %expire_at,
            "Credential issued"
        );

        Ok(IssuedCredential {
            credential,
            issued_at,
            expire_at,
        })
    }
}

fn require_commitment(user: &User) -> Result<()> {
    if user.has_identity_commitment() {
        Ok(())
    } else {
        Err(ProofPassError::Validation(
            "identity commitment not set".to_string(),
        ))
    }
}
