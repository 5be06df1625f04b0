//! Session extractors.
//!
//! Protected handlers take a [`SessionUser`]; the extractor reads the
//! `Authorization: Bearer <token>` header and validates the token against the
//! service state.

use crate::services::{Backend, ProofPass};
use crate::state::UserId;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use proofpass_web::AppError;
use std::sync::Arc;

/// Bearer token extracted from `Authorization: Bearer <token>` header.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("Missing authorization header"))?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::unauthorized("Invalid authorization format. Expected 'Bearer <token>'")
        })?;

        if token.is_empty() {
            return Err(AppError::unauthorized("Empty bearer token"));
        }

        Ok(Self(token.to_string()))
    }
}

/// Authenticated caller.
///
/// Use this as a handler parameter to require a valid session token.
#[derive(Debug, Clone)]
pub struct SessionUser {
    /// The authenticated user ID
    pub user_id: UserId,
    /// Email carried in the token
    pub email: String,
}

#[async_trait]
impl<B: Backend> FromRequestParts<Arc<ProofPass<B>>> for SessionUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<ProofPass<B>>,
    ) -> Result<Self, Self::Rejection> {
        let bearer = BearerToken::from_request_parts(parts, state).await?;

        let claims = state.authenticate(&bearer.0)?;
        let user_id = claims.user_id()?;

        Ok(Self {
            user_id,
            email: claims.email,
        })
    }
}
