//! Users.

use super::PostgresDatabase;
use crate::error::{ProofPassError, Result};
use crate::providers::UserRepository;
use crate::state::{IdentityUpdate, User, UserId};
use uuid::Uuid;

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    identity_commitment: String,
    encrypted_internal_nullifier: String,
    encrypted_identity_secret: String,
    is_encrypted: bool,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: UserId(row.id),
            email: row.email,
            identity_commitment: row.identity_commitment,
            encrypted_internal_nullifier: row.encrypted_internal_nullifier,
            encrypted_identity_secret: row.encrypted_identity_secret,
            is_encrypted: row.is_encrypted,
        }
    }
}

const USER_COLUMNS: &str = "id, email, identity_commitment, encrypted_internal_nullifier, \
                            encrypted_identity_secret, is_encrypted";

impl UserRepository for PostgresDatabase {
    async fn get_user(&self, user_id: UserId) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(user_id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ProofPassError::internal("users.get", e))?;

        Ok(row.map(User::from))
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ProofPassError::internal("users.get_by_email", e))?;

        Ok(row.map(User::from))
    }

    async fn get_or_create_user(&self, email: &str) -> Result<User> {
        // The no-op update makes RETURNING yield the existing row on conflict
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r"
            INSERT INTO users (id, email)
            VALUES ($1, $2)
            ON CONFLICT (email) DO UPDATE SET email = EXCLUDED.email
            RETURNING {USER_COLUMNS}
            "
        ))
        .bind(Uuid::new_v4())
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| ProofPassError::internal("users.get_or_create", e))?;

        Ok(row.into())
    }

    async fn set_identity(&self, user_id: UserId, identity: &IdentityUpdate) -> Result<bool> {
        let result = sqlx::query(
            r"
            UPDATE users
            SET identity_commitment = $2,
                encrypted_internal_nullifier = $3,
                encrypted_identity_secret = $4,
                updated_at = NOW()
            WHERE id = $1
              AND identity_commitment = ''
              AND encrypted_internal_nullifier = ''
              AND encrypted_identity_secret = ''
            ",
        )
        .bind(user_id.0)
        .bind(&identity.identity_commitment)
        .bind(&identity.encrypted_internal_nullifier)
        .bind(&identity.encrypted_identity_secret)
        .execute(&self.pool)
        .await
        .map_err(|e| ProofPassError::internal("users.set_identity", e))?;

        Ok(result.rows_affected() == 1)
    }
}
