//! Attendance ledger storage.

use super::PostgresDatabase;
use crate::error::{ProofPassError, Result};
use crate::providers::AttendanceRepository;
use crate::state::EventId;
use uuid::Uuid;

impl AttendanceRepository for PostgresDatabase {
    async fn record_attendance(&self, event_id: EventId, nullifier: &str) -> Result<Option<Uuid>> {
        // No row comes back when UNIQUE (event_id, nullifier) rejects the insert
        sqlx::query_scalar::<_, Uuid>(
            r"
            INSERT INTO attendances (id, event_id, nullifier)
            VALUES ($1, $2, $3)
            ON CONFLICT (event_id, nullifier) DO NOTHING
            RETURNING id
            ",
        )
        .bind(Uuid::new_v4())
        .bind(event_id.0)
        .bind(nullifier)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ProofPassError::internal("attendance.record", e))
    }

    async fn count_attendance(&self, event_id: EventId) -> Result<u64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM attendances WHERE event_id = $1",
        )
        .bind(event_id.0)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| ProofPassError::internal("attendance.count", e))?;

        u64::try_from(count).map_err(|e| ProofPassError::internal("attendance.count", e))
    }
}
