//! Stored ticket and email credentials.

use super::PostgresDatabase;
use crate::error::{ProofPassError, Result};
use crate::providers::{EmailCredentialRepository, TicketCredentialRepository};
use crate::state::{EmailCredential, EventId, TicketCredential};
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(sqlx::FromRow)]
struct TicketCredentialRow {
    id: Uuid,
    event_id: Uuid,
    email: String,
    credential: String,
    issued_at: DateTime<Utc>,
    expire_at: DateTime<Utc>,
}

impl From<TicketCredentialRow> for TicketCredential {
    fn from(row: TicketCredentialRow) -> Self {
        Self {
            id: row.id,
            event_id: EventId(row.event_id),
            email: row.email,
            credential: row.credential,
            issued_at: row.issued_at,
            expire_at: row.expire_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct EmailCredentialRow {
    id: Uuid,
    identity_commitment: String,
    credential: String,
    issued_at: DateTime<Utc>,
    expire_at: DateTime<Utc>,
}

impl From<EmailCredentialRow> for EmailCredential {
    fn from(row: EmailCredentialRow) -> Self {
        Self {
            id: row.id,
            identity_commitment: row.identity_commitment,
            credential: row.credential,
            issued_at: row.issued_at,
            expire_at: row.expire_at,
        }
    }
}

impl TicketCredentialRepository for PostgresDatabase {
    async fn ticket_credential_exists(&self, event_id: EventId, email: &str) -> Result<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM ticket_credentials WHERE event_id = $1 AND email = $2)",
        )
        .bind(event_id.0)
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| ProofPassError::internal("ticket_credentials.exists", e))
    }

    async fn list_ticket_credentials(&self, email: &str) -> Result<Vec<TicketCredential>> {
        let rows = sqlx::query_as::<_, TicketCredentialRow>(
            r"
            SELECT id, event_id, email, credential, issued_at, expire_at
            FROM ticket_credentials
            WHERE email = $1
            ORDER BY issued_at DESC
            ",
        )
        .bind(email)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ProofPassError::internal("ticket_credentials.list", e))?;

        Ok(rows.into_iter().map(TicketCredential::from).collect())
    }

    async fn upsert_ticket_credential(&self, credential: &TicketCredential) -> Result<TicketCredential> {
        let row = sqlx::query_as::<_, TicketCredentialRow>(
            r"
            INSERT INTO ticket_credentials (id, event_id, email, credential, issued_at, expire_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (event_id, email) DO UPDATE SET
                credential = EXCLUDED.credential,
                issued_at = EXCLUDED.issued_at,
                expire_at = EXCLUDED.expire_at
            RETURNING id, event_id, email, credential, issued_at, expire_at
            ",
        )
        .bind(credential.id)
        .bind(credential.event_id.0)
        .bind(&credential.email)
        .bind(&credential.credential)
        .bind(credential.issued_at)
        .bind(credential.expire_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| ProofPassError::internal("ticket_credentials.upsert", e))?;

        Ok(TicketCredential::from(row))
    }
}

impl EmailCredentialRepository for PostgresDatabase {
    async fn get_email_credential(&self, identity_commitment: &str) -> Result<Option<EmailCredential>> {
        let row = sqlx::query_as::<_, EmailCredentialRow>(
            r"
            SELECT id, identity_commitment, credential, issued_at, expire_at
            FROM email_credentials
            WHERE identity_commitment = $1
            ",
        )
        .bind(identity_commitment)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ProofPassError::internal("email_credentials.get", e))?;

        Ok(row.map(EmailCredential::from))
    }

    async fn upsert_email_credential(&self, credential: &EmailCredential) -> Result<EmailCredential> {
        let row = sqlx::query_as::<_, EmailCredentialRow>(
            r"
            INSERT INTO email_credentials (id, identity_commitment, credential, issued_at, expire_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (identity_commitment) DO UPDATE SET
                credential = EXCLUDED.credential,
                issued_at = EXCLUDED.issued_at,
                expire_at = EXCLUDED.expire_at
            RETURNING id, identity_commitment, credential, issued_at, expire_at
            ",
        )
        .bind(credential.id)
        .bind(&credential.identity_commitment)
        .bind(&credential.credential)
        .bind(credential.issued_at)
        .bind(credential.expire_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| ProofPassError::internal("email_credentials.upsert", e))?;

        Ok(EmailCredential::from(row))
    }
}
