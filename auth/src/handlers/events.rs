//! Event endpoints: the public catalogue, event management, ticket
//! credentials and attendance check-in.

use crate::handlers::session::SessionUser;
use crate::services::{Backend, ProofPass};
use crate::state::{AttendanceClaim, Event, EventId, EventUpdate, IssuedCredential, NewEvent};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use proofpass_web::{AppError, CorrelationId, JsonBody, OptionalJsonBody};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Optional body of a ticket credential request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TicketCredentialRequest {
    /// Context the client expects; must equal the event's.
    pub context_id: Option<String>,
}

/// Response after recording an attendance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceResponse {
    /// Attendance record id.
    pub id: Uuid,
}

/// All events.
///
/// `GET /events`
pub async fn list_events<B: Backend>(
    State(proofpass): State<Arc<ProofPass<B>>>,
    correlation_id: CorrelationId,
) -> Result<Json<Vec<Event>>, AppError> {
    let ctx = proofpass.context(correlation_id.0);
    Ok(Json(proofpass.events().list(&ctx).await?))
}

/// One event. The admin code is never serialized.
///
/// `GET /events/{id}`
pub async fn get_event<B: Backend>(
    State(proofpass): State<Arc<ProofPass<B>>>,
    correlation_id: CorrelationId,
    Path(event_id): Path<String>,
) -> Result<Json<Event>, AppError> {
    let ctx = proofpass.context(correlation_id.0);
    let event_id: EventId = event_id.parse()?;
    Ok(Json(proofpass.events().get(&ctx, event_id).await?))
}

/// Create an event; the caller becomes its first admin.
///
/// `POST /events`
pub async fn create_event<B: Backend>(
    State(proofpass): State<Arc<ProofPass<B>>>,
    correlation_id: CorrelationId,
    session: SessionUser,
    JsonBody(input): JsonBody<NewEvent>,
) -> Result<(StatusCode, Json<Event>), AppError> {
    let ctx = proofpass.context(correlation_id.0);
    let event = proofpass
        .events()
        .create(&ctx, session.user_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// Update an event the caller administers.
///
/// `PUT /events/{id}`
pub async fn update_event<B: Backend>(
    State(proofpass): State<Arc<ProofPass<B>>>,
    correlation_id: CorrelationId,
    session: SessionUser,
    Path(event_id): Path<String>,
    JsonBody(update): JsonBody<EventUpdate>,
) -> Result<Json<Event>, AppError> {
    let ctx = proofpass.context(correlation_id.0);
    let event_id: EventId = event_id.parse()?;
    let event = proofpass
        .events()
        .update(&ctx, session.user_id, event_id, update)
        .await?;
    Ok(Json(event))
}

/// Have the issuer sign a ticket credential for the caller.
///
/// # Endpoint
///
/// ```text
/// POST /events/{id}/request-ticket-credential
/// Authorization: Bearer <token>
///
/// { "context_id": "..." }   (optional)
/// ```
///
/// # Response
///
/// - `201 Created`: the signed credential with server-side timestamps
/// - `400 Bad Request`: not registered, identity not set, wrong context, or
///   already issued (code `CONFLICT`)
/// - `401 Unauthorized`: missing or invalid session
/// - `404 Not Found`: unknown event
pub async fn request_ticket_credential<B: Backend>(
    State(proofpass): State<Arc<ProofPass<B>>>,
    correlation_id: CorrelationId,
    session: SessionUser,
    Path(event_id): Path<String>,
    OptionalJsonBody(body): OptionalJsonBody<TicketCredentialRequest>,
) -> Result<(StatusCode, Json<IssuedCredential>), AppError> {
    let ctx = proofpass.context(correlation_id.0);
    let event_id: EventId = event_id.parse()?;
    let request = body.unwrap_or_default();

    let issued = proofpass
        .credentials()
        .request_ticket_credential(
            &ctx,
            session.user_id,
            event_id,
            request.context_id.as_deref(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(issued)))
}

/// Record an attendance. Authorized by the event's admin code, not a session.
///
/// # Endpoint
///
/// ```text
/// POST /events/{id}/attendance
///
/// { "type": "1", "context": "...", "nullifier": "...", "key_id": "...", "admin_code": "..." }
/// ```
///
/// # Response
///
/// - `201 Created`: `{ "id": "..." }`
/// - `400 Bad Request`: wrong credential type or context, or already recorded
///   (code `CONFLICT`)
/// - `401 Unauthorized`: wrong admin code
/// - `404 Not Found`: unknown event
pub async fn record_attendance<B: Backend>(
    State(proofpass): State<Arc<ProofPass<B>>>,
    correlation_id: CorrelationId,
    Path(event_id): Path<String>,
    JsonBody(claim): JsonBody<AttendanceClaim>,
) -> Result<(StatusCode, Json<AttendanceResponse>), AppError> {
    let ctx = proofpass.context(correlation_id.0);
    let event_id: EventId = event_id.parse()?;
    let id = proofpass.attendance().record(&ctx, event_id, &claim).await?;
    Ok((StatusCode::CREATED, Json(AttendanceResponse { id })))
}
