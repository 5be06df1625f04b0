//! Attendance ledger.
//!
//! Per `(event, nullifier)` the only transition is `Unseen → Recorded`. The
//! uniqueness of that pair is enforced by the store's single conditional
//! insert; the ledger never reads before writing.

use crate::constants::metrics as metric_names;
use crate::error::{ProofPassError, Result};
use crate::providers::{AttendanceRepository, EventRepository};
use crate::state::{AttendanceClaim, CredentialKind, EventId};
use crate::utils::require_non_empty;
use proofpass_core::RequestContext;
use uuid::Uuid;

/// Validates attendance claims and records each one exactly once.
#[derive(Clone, Debug)]
pub struct AttendanceLedger<D> {
    db: D,
}

impl<D> AttendanceLedger<D>
where
    D: EventRepository + AttendanceRepository,
{
    /// Create a ledger.
    #[must_use]
    pub const fn new(db: D) -> Self {
        Self { db }
    }

    /// Record an attendance claim for `event_id`.
    ///
    /// Checks run in order and stop at the first failure:
    ///
    /// 1. event exists, else `NotFound`
    /// 2. admin code matches (constant time), else `Unauthorized`
    /// 3. credential type is recognized, else `InvalidRequest`
    /// 4. credential context is the event's, else `InvalidRequest`
    /// 5. `(event, nullifier)` not yet recorded, else `Conflict`
    ///
    /// The issuer key named in the claim is logged but not verified.
    ///
    /// # Returns
    ///
    /// Id of the new attendance record.
    ///
    /// # Errors
    ///
    /// The failures above, `Validation` for an empty nullifier, and
    /// `Internal`/`Cancelled` from the store.
    #[tracing::instrument(
        skip_all,
        name = "attendance.record",
        fields(correlation_id = %ctx.correlation_id(), event_id = %event_id)
    )]
    pub async fn record(
        &self,
        ctx: &RequestContext,
        event_id: EventId,
        claim: &AttendanceClaim,
    ) -> Result<Uuid> {
        require_non_empty("nullifier", &claim.nullifier)?;

        let event = ctx
            .run("events.get", self.db.get_event(event_id))
            .await?
            .ok_or(ProofPassError::NotFound("event"))?;

        if !constant_time_eq::constant_time_eq(
            event.admin_code.as_bytes(),
            claim.admin_code.as_bytes(),
        ) {
            tracing::info!("Invalid admin code");
            return Err(ProofPassError::Unauthorized("invalid admin code".to_string()));
        }

        let kind: CredentialKind = claim.credential_type.parse()?;

        let context_matches = event
            .context_id
            .as_ref()
            .is_some_and(|context| context.as_str() == claim.context);
        if !context_matches {
            tracing::info!(context = %claim.context, "Invalid credential context");
            return Err(ProofPassError::InvalidRequest(
                "invalid credential context".to_string(),
            ));
        }

        let Some(attendance_id) = ctx
            .run(
                "attendance.record",
                self.db.record_attendance(event_id, &claim.nullifier),
            )
            .await?
        else {
            tracing::info!(nullifier = %claim.nullifier, "Attendance already recorded");
            return Err(ProofPassError::Conflict(
                "attendance already recorded".to_string(),
            ));
        };

        metrics::counter!(metric_names::ATTENDANCE_RECORDED).increment(1);
        tracing::info!(
            attendance_id = %attendance_id,
            credential_type = %kind,
            key_id = %claim.key_id,
            "Attendance recorded"
        );

        Ok(attendance_id)
    }

    /// Number of attendances recorded for an event.
    ///
    /// # Errors
    ///
    /// Returns `Internal`/`Cancelled` from the store.
    pub async fn count(&self, ctx: &RequestContext, event_id: EventId) -> Result<u64> {
        ctx.run("attendance.count", self.db.count_attendance(event_id))
            .await
    }
}
