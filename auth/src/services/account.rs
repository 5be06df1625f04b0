//! Account service: the caller's own user record and stored credentials.

use crate::error::{ProofPassError, Result};
use crate::providers::{
    EmailCredentialRepository, EventRepository, TicketCredentialRepository, UserRepository,
};
use crate::state::{
    CredentialUpload, EmailCredential, EventId, IdentityUpdate, TicketCredential, User, UserId,
};
use crate::utils::require_non_empty;
use proofpass_core::RequestContext;
use uuid::Uuid;

/// User-facing account operations.
#[derive(Clone, Debug)]
pub struct AccountService<D> {
    db: D,
}

impl<D> AccountService<D>
where
    D: UserRepository + EventRepository + TicketCredentialRepository + EmailCredentialRepository,
{
    /// Create an account service.
    #[must_use]
    pub const fn new(db: D) -> Self {
        Self { db }
    }

    /// Return the user for a verified email, creating it on first login.
    ///
    /// # Errors
    ///
    /// Returns `Internal`/`Cancelled` from the store.
    pub async fn get_or_create_user(&self, ctx: &RequestContext, email: &str) -> Result<User> {
        ctx.run("users.get_or_create", self.db.get_or_create_user(email))
            .await
    }

    /// The caller's user record.
    ///
    /// # Errors
    ///
    /// `NotFound` if the user was deleted after the token was issued.
    pub async fn current_user(&self, ctx: &RequestContext, user_id: UserId) -> Result<User> {
        ctx.run("users.get", self.db.get_user(user_id))
            .await?
            .ok_or(ProofPassError::NotFound("user"))
    }

    /// Set the identity commitment and encrypted blobs. Allowed once.
    ///
    /// # Errors
    ///
    /// - `Validation` if any field is empty
    /// - `NotFound` if the user does not exist
    /// - `Conflict` if the identity was already set
    #[tracing::instrument(
        skip_all,
        name = "account.set_identity",
        fields(correlation_id = %ctx.correlation_id(), user_id = %user_id)
    )]
    pub async fn set_identity(
        &self,
        ctx: &RequestContext,
        user_id: UserId,
        identity: &IdentityUpdate,
    ) -> Result<User> {
        require_non_empty("identity_commitment", &identity.identity_commitment)?;
        require_non_empty(
            "encrypted_internal_nullifier",
            &identity.encrypted_internal_nullifier,
        )?;
        require_non_empty(
            "encrypted_identity_secret",
            &identity.encrypted_identity_secret,
        )?;

        let updated = ctx
            .run("users.set_identity", self.db.set_identity(user_id, identity))
            .await?;

        let user = self.current_user(ctx, user_id).await?;
        if !updated {
            tracing::info!("Identity already set");
            return Err(ProofPassError::Conflict("identity already set".to_string()));
        }

        tracing::info!("Identity set");
        Ok(user)
    }

    /// The email credential stored for the caller's identity commitment.
    ///
    /// `None` when nothing is stored or no commitment is set yet.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown user, `Internal`/`Cancelled` from the store.
    pub async fn email_credential(
        &self,
        ctx: &RequestContext,
        user_id: UserId,
    ) -> Result<Option<EmailCredential>> {
        let user = self.current_user(ctx, user_id).await?;
        if !user.has_identity_commitment() {
            return Ok(None);
        }

        ctx.run(
            "email_credentials.get",
            self.db.get_email_credential(&user.identity_commitment),
        )
        .await
    }

    /// The caller's stored ticket credentials.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown user, `Internal`/`Cancelled` from the store.
    pub async fn ticket_credentials(
        &self,
        ctx: &RequestContext,
        user_id: UserId,
    ) -> Result<Vec<TicketCredential>> {
        let user = self.current_user(ctx, user_id).await?;
        ctx.run(
            "ticket_credentials.list",
            self.db.list_ticket_credentials(&user.email),
        )
        .await
    }

    /// Store the client-encrypted email credential.
    ///
    /// # Errors
    ///
    /// - `Validation` if the upload is empty or expires before it is issued,
    ///   or the identity commitment is not set
    /// - `NotFound` for an unknown user
    #[tracing::instrument(
        skip_all,
        name = "account.store_email_credential",
        fields(correlation_id = %ctx.correlation_id(), user_id = %user_id)
    )]
    pub async fn store_email_credential(
        &self,
        ctx: &RequestContext,
        user_id: UserId,
        upload: &CredentialUpload,
    ) -> Result<EmailCredential> {
        validate_upload(upload)?;
        let user = self.current_user(ctx, user_id).await?;
        if !user.has_identity_commitment() {
            return Err(ProofPassError::Validation(
                "identity commitment not set".to_string(),
            ));
        }

        let credential = EmailCredential {
            id: Uuid::new_v4(),
            identity_commitment: user.identity_commitment,
            credential: upload.credential.clone(),
            issued_at: upload.issued_at,
            expire_at: upload.expire_at,
        };

        let stored = ctx
            .run(
                "email_credentials.upsert",
                self.db.upsert_email_credential(&credential),
            )
            .await?;

        tracing::info!(credential_id = %stored.id, "Email credential stored");
        Ok(stored)
    }

    /// Store a client-encrypted ticket credential for `event_id`.
    ///
    /// # Errors
    ///
    /// - `Validation` if the upload is empty or expires before it is issued,
    ///   or the event does not exist
    /// - `NotFound` for an unknown user
    #[tracing::instrument(
        skip_all,
        name = "account.store_ticket_credential",
        fields(correlation_id = %ctx.correlation_id(), user_id = %user_id, event_id = %event_id)
    )]
    pub async fn store_ticket_credential(
        &self,
        ctx: &RequestContext,
        user_id: UserId,
        event_id: EventId,
        upload: &CredentialUpload,
    ) -> Result<TicketCredential> {
        validate_upload(upload)?;
        let user = self.current_user(ctx, user_id).await?;

        let event_exists = ctx
            .run("events.get", self.db.get_event(event_id))
            .await?
            .is_some();
        if !event_exists {
            return Err(ProofPassError::Validation(format!("unknown event: {event_id}")));
        }

        let credential = TicketCredential {
            id: Uuid::new_v4(),
            event_id,
            email: user.email,
            credential: upload.credential.clone(),
            issued_at: upload.issued_at,
            expire_at: upload.expire_at,
        };

        let stored = ctx
            .run(
                "ticket_credentials.upsert",
                self.db.upsert_ticket_credential(&credential),
            )
            .await?;

        tracing::info!(credential_id = %stored.id, "Ticket credential stored");
        Ok(stored)
    }
}

fn validate_upload(upload: &CredentialUpload) -> Result<()> {
    require_non_empty("credential", &upload.credential)?;
    if upload.expire_at <= upload.issued_at {
        return Err(ProofPassError::Validation(
            "expire_at must be after issued_at".to_string(),
        ));
    }
    Ok(())
}
