//! User endpoints: one-time-code login and the caller's own account.

use crate::handlers::session::SessionUser;
use crate::services::{Backend, ProofPass};
use crate::state::{
    CredentialUpload, EmailCredential, EventId, IdentityUpdate, IssuedCredential,
    TicketCredential, User,
};
use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use proofpass_web::{AppError, ClientIp, CorrelationId, JsonBody};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Request a verification code.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RequestCodeRequest {
    /// Email address to send the code to.
    pub email: String,
}

/// Response after sending a code.
#[derive(Debug, Clone, Serialize)]
pub struct RequestCodeResponse {
    /// Confirmation message.
    pub message: String,

    /// When the code stops being redeemable.
    pub expires_at: DateTime<Utc>,
}

/// Log in with a verification code.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoginRequest {
    /// Email the code was sent to.
    pub email: String,

    /// The code.
    pub code: String,
}

/// Response after a successful login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Session token for the `Authorization: Bearer` header.
    pub token: String,
}

/// Store a ticket credential.
#[derive(Debug, Clone, Deserialize)]
pub struct TicketCredentialUploadRequest {
    /// Event the ticket is for.
    pub event_id: String,

    /// Ciphertext and timestamps.
    #[serde(flatten)]
    pub upload: CredentialUpload,
}

/// Send a verification code.
///
/// # Endpoint
///
/// ```text
/// POST /user/request-verification-code
/// Content-Type: application/json
///
/// { "email": "user@example.com" }
/// ```
///
/// # Response
///
/// - `200 OK`: code sent
/// - `400 Bad Request`: malformed email
/// - `429 Too Many Requests`: a code for this email is still pending
pub async fn request_verification_code<B: Backend>(
    State(proofpass): State<Arc<ProofPass<B>>>,
    correlation_id: CorrelationId,
    client_ip: ClientIp,
    JsonBody(request): JsonBody<RequestCodeRequest>,
) -> Result<Json<RequestCodeResponse>, AppError> {
    let ctx = proofpass.context(correlation_id.0);
    tracing::debug!(client_ip = %client_ip.0, "Verification code requested");

    let expires_at = proofpass.otc().request_code(&ctx, &request.email).await?;

    Ok(Json(RequestCodeResponse {
        message: "Verification code sent. Check your email.".to_string(),
        expires_at,
    }))
}

/// Redeem a verification code and start a session.
///
/// # Endpoint
///
/// ```text
/// POST /user/login
/// Content-Type: application/json
///
/// { "email": "user@example.com", "code": "123456" }
/// ```
///
/// # Response
///
/// - `200 OK`: `{ "token": "eyJhbGc..." }`
/// - `400 Bad Request`: malformed email or empty code
/// - `401 Unauthorized`: wrong, expired or already used code
pub async fn login<B: Backend>(
    State(proofpass): State<Arc<ProofPass<B>>>,
    correlation_id: CorrelationId,
    JsonBody(request): JsonBody<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let ctx = proofpass.context(correlation_id.0);
    let outcome = proofpass.login(&ctx, &request.email, &request.code).await?;

    Ok(Json(LoginResponse {
        token: outcome.token,
    }))
}

/// The caller's user record.
///
/// `GET /user/me`
pub async fn get_me<B: Backend>(
    State(proofpass): State<Arc<ProofPass<B>>>,
    correlation_id: CorrelationId,
    session: SessionUser,
) -> Result<Json<User>, AppError> {
    let ctx = proofpass.context(correlation_id.0);
    let user = proofpass.accounts().current_user(&ctx, session.user_id).await?;
    Ok(Json(user))
}

/// Set the identity commitment and encrypted blobs (once).
///
/// `PUT /user/me`, second call answers `400` with code `CONFLICT`.
pub async fn update_me<B: Backend>(
    State(proofpass): State<Arc<ProofPass<B>>>,
    correlation_id: CorrelationId,
    session: SessionUser,
    JsonBody(identity): JsonBody<IdentityUpdate>,
) -> Result<Json<User>, AppError> {
    let ctx = proofpass.context(correlation_id.0);
    let user = proofpass
        .accounts()
        .set_identity(&ctx, session.user_id, &identity)
        .await?;
    Ok(Json(user))
}

/// The caller's stored email credential, or `null`.
///
/// `GET /user/me/email-credential`
pub async fn get_email_credential<B: Backend>(
    State(proofpass): State<Arc<ProofPass<B>>>,
    correlation_id: CorrelationId,
    session: SessionUser,
) -> Result<Json<Option<EmailCredential>>, AppError> {
    let ctx = proofpass.context(correlation_id.0);
    let credential = proofpass
        .accounts()
        .email_credential(&ctx, session.user_id)
        .await?;
    Ok(Json(credential))
}

/// Store the caller's encrypted email credential.
///
/// `PUT /user/me/email-credential`
pub async fn put_email_credential<B: Backend>(
    State(proofpass): State<Arc<ProofPass<B>>>,
    correlation_id: CorrelationId,
    session: SessionUser,
    JsonBody(upload): JsonBody<CredentialUpload>,
) -> Result<(StatusCode, Json<EmailCredential>), AppError> {
    let ctx = proofpass.context(correlation_id.0);
    let stored = proofpass
        .accounts()
        .store_email_credential(&ctx, session.user_id, &upload)
        .await?;
    Ok((StatusCode::CREATED, Json(stored)))
}

/// The caller's stored ticket credentials.
///
/// `GET /user/me/ticket-credentials`
pub async fn list_ticket_credentials<B: Backend>(
    State(proofpass): State<Arc<ProofPass<B>>>,
    correlation_id: CorrelationId,
    session: SessionUser,
) -> Result<Json<Vec<TicketCredential>>, AppError> {
    let ctx = proofpass.context(correlation_id.0);
    let credentials = proofpass
        .accounts()
        .ticket_credentials(&ctx, session.user_id)
        .await?;
    Ok(Json(credentials))
}

/// Store one of the caller's encrypted ticket credentials.
///
/// `PUT /user/me/ticket-credential`
pub async fn put_ticket_credential<B: Backend>(
    State(proofpass): State<Arc<ProofPass<B>>>,
    correlation_id: CorrelationId,
    session: SessionUser,
    JsonBody(request): JsonBody<TicketCredentialUploadRequest>,
) -> Result<(StatusCode, Json<TicketCredential>), AppError> {
    let ctx = proofpass.context(correlation_id.0);
    let event_id: EventId = request.event_id.parse()?;
    let stored = proofpass
        .accounts()
        .store_ticket_credential(&ctx, session.user_id, event_id, &request.upload)
        .await?;
    Ok((StatusCode::CREATED, Json(stored)))
}

/// Have the issuer sign an email credential for the caller.
///
/// `POST /user/me/request-email-credential`
///
/// # Response
///
/// - `201 Created`: the signed credential with server-side timestamps
/// - `400 Bad Request`: identity commitment not set
/// - `401 Unauthorized`: missing or invalid session
pub async fn request_email_credential<B: Backend>(
    State(proofpass): State<Arc<ProofPass<B>>>,
    correlation_id: CorrelationId,
    session: SessionUser,
) -> Result<(StatusCode, Json<IssuedCredential>), AppError> {
    let ctx = proofpass.context(correlation_id.0);
    let issued = proofpass
        .credentials()
        .request_email_credential(&ctx, session.user_id)
        .await?;
    Ok((StatusCode::CREATED, Json(issued)))
}
