//! Events, event admins and registrations.

use super::PostgresDatabase;
use crate::error::{ProofPassError, Result};
use crate::providers::{EventAdminRepository, EventRepository, RegistrationRepository};
use crate::state::{ContextId, Event, EventId, UserId};
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(sqlx::FromRow)]
struct EventRow {
    id: Uuid,
    name: String,
    description: String,
    url: String,
    admin_code: String,
    chain_id: String,
    context_id: Option<String>,
    context_string: String,
    issuer_key_id: String,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
}

impl From<EventRow> for Event {
    fn from(row: EventRow) -> Self {
        Self {
            id: EventId(row.id),
            name: row.name,
            description: row.description,
            url: row.url,
            admin_code: row.admin_code,
            chain_id: row.chain_id,
            context_id: row.context_id.map(ContextId::new),
            context_string: row.context_string,
            issuer_key_id: row.issuer_key_id,
            start_date: row.start_date,
            end_date: row.end_date,
        }
    }
}

const EVENT_COLUMNS: &str = "id, name, description, url, admin_code, chain_id, context_id, \
                             context_string, issuer_key_id, start_date, end_date";

impl EventRepository for PostgresDatabase {
    async fn list_events(&self) -> Result<Vec<Event>> {
        let rows = sqlx::query_as::<_, EventRow>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events ORDER BY start_date ASC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ProofPassError::internal("events.list", e))?;

        Ok(rows.into_iter().map(Event::from).collect())
    }

    async fn get_event(&self, event_id: EventId) -> Result<Option<Event>> {
        let row = sqlx::query_as::<_, EventRow>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE id = $1"
        ))
        .bind(event_id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ProofPassError::internal("events.get", e))?;

        Ok(row.map(Event::from))
    }

    async fn create_event(&self, event: &Event, creator: UserId) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| ProofPassError::internal("events.create", e))?;

        sqlx::query(
            r"
            INSERT INTO events (id, name, description, url, admin_code, chain_id,
                                context_id, context_string, issuer_key_id, start_date, end_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ",
        )
        .bind(event.id.0)
        .bind(&event.name)
        .bind(&event.description)
        .bind(&event.url)
        .bind(&event.admin_code)
        .bind(&event.chain_id)
        .bind(event.context_id.as_ref().map(ContextId::as_str))
        .bind(&event.context_string)
        .bind(&event.issuer_key_id)
        .bind(event.start_date)
        .bind(event.end_date)
        .execute(&mut *tx)
        .await
        .map_err(|e| ProofPassError::internal("events.create", e))?;

        sqlx::query("INSERT INTO event_admins (event_id, user_id) VALUES ($1, $2)")
            .bind(event.id.0)
            .bind(creator.0)
            .execute(&mut *tx)
            .await
            .map_err(|e| ProofPassError::internal("event_admins.create", e))?;

        tx.commit()
            .await
            .map_err(|e| ProofPassError::internal("events.create", e))?;

        Ok(())
    }

    async fn update_event(&self, event: &Event) -> Result<()> {
        // Context columns are deliberately absent from the SET list
        let result = sqlx::query(
            r"
            UPDATE events
            SET name = $2, description = $3, url = $4, admin_code = $5,
                start_date = $6, end_date = $7, updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(event.id.0)
        .bind(&event.name)
        .bind(&event.description)
        .bind(&event.url)
        .bind(&event.admin_code)
        .bind(event.start_date)
        .bind(event.end_date)
        .execute(&self.pool)
        .await
        .map_err(|e| ProofPassError::internal("events.update", e))?;

        if result.rows_affected() == 0 {
            return Err(ProofPassError::NotFound("event"));
        }
        Ok(())
    }
}

impl EventAdminRepository for PostgresDatabase {
    async fn is_event_admin(&self, event_id: EventId, user_id: UserId) -> Result<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM event_admins WHERE event_id = $1 AND user_id = $2)",
        )
        .bind(event_id.0)
        .bind(user_id.0)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| ProofPassError::internal("event_admins.check", e))
    }
}

impl RegistrationRepository for PostgresDatabase {
    async fn is_registered(&self, event_id: EventId, email: &str) -> Result<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM registrations WHERE event_id = $1 AND email = $2)",
        )
        .bind(event_id.0)
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| ProofPassError::internal("registrations.exists", e))
    }
}
