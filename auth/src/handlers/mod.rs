//! HTTP handlers for the ProofPass API.
//!
//! Handlers are thin: extract, build a [`RequestContext`](proofpass_core::RequestContext)
//! from the correlation id, call one service method, map the result. Every
//! domain error goes through the [`AppError`] conversion below.

pub mod events;
pub mod session;
pub mod user;

use crate::error::ProofPassError;
use proofpass_web::AppError;

/// Map domain errors onto the HTTP error body.
///
/// Collaborator failures keep their details in the logged source only.
impl From<ProofPassError> for AppError {
    fn from(err: ProofPassError) -> Self {
        match err {
            ProofPassError::Validation(message) | ProofPassError::InvalidRequest(message) => {
                Self::bad_request(message)
            }
            ProofPassError::InvalidContext(message) => Self::invalid_context(message),
            ProofPassError::Unauthorized(message) => Self::unauthorized(message),
            ProofPassError::InvalidToken => Self::unauthorized("Invalid or expired session token"),
            ProofPassError::NotFound(what) => Self::not_found(format!("{what} not found")),
            ProofPassError::Conflict(message) => Self::conflict(message),
            ProofPassError::RateLimited => Self::too_many_requests(err.to_string()),
            ProofPassError::Cancelled { .. } => {
                Self::timeout("Request deadline exceeded").with_source(anyhow::Error::new(err))
            }
            ProofPassError::Internal { .. } => {
                Self::internal("An internal error occurred").with_source(anyhow::Error::new(err))
            }
        }
    }
}
