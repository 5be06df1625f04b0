//! Axum integration for the ProofPass HTTP surface.
//!
//! This crate holds the HTTP plumbing that is independent of the credential
//! domain:
//!
//! - [`AppError`]: the JSON error body (`{code, message}`) every handler returns
//! - [`extractors`]: correlation id, client address and JSON body extractors
//! - [`middleware`]: correlation-id propagation and the CORS policy
//! - [`handlers::health_check`]: liveness endpoint
//!
//! # Request Flow
//!
//! 1. **HTTP Request** arrives and gets a correlation id (header or fresh UUID)
//! 2. **Extract data** from request (JSON, headers, bearer token)
//! 3. **Call the service** with a request context carrying the correlation id
//! 4. **Map result** to HTTP response, domain errors through [`AppError`]

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;

// Re-export key types for convenience
pub use error::AppError;
pub use extractors::{ClientIp, CorrelationId, JsonBody, OptionalJsonBody};
pub use middleware::{CORRELATION_ID_HEADER, CorrelationIdExt, correlation_id_layer, cors_layer};

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
