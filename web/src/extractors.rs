//! Custom Axum extractors.
//!
//! - `CorrelationId`: the id assigned by the correlation-id layer, or read
//!   from the `X-Correlation-ID` header, or freshly generated
//! - `ClientIp`: client IP address from proxy headers
//! - `JsonBody`: JSON request body, rejections answered as `400` [`AppError`]
//! - `OptionalJsonBody`: like `JsonBody`, but an empty body yields `None`
//!
//! # Examples
//!
//! ```ignore
//! use proofpass_web::extractors::{ClientIp, CorrelationId};
//!
//! async fn handler(correlation_id: CorrelationId, client_ip: ClientIp) -> String {
//!     tracing::info!(
//!         correlation_id = %correlation_id.0,
//!         client_ip = %client_ip.0,
//!         "Processing request"
//!     );
//!     "ok".to_string()
//! }
//! ```

use crate::error::AppError;
use crate::middleware::CORRELATION_ID_HEADER;
use axum::{
    Json, async_trait,
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Request},
    http::{HeaderMap, request::Parts},
};
use serde::de::DeserializeOwned;
use std::net::{IpAddr, Ipv4Addr};
use uuid::Uuid;

/// Correlation ID for request tracing.
///
/// Prefers the id stored in request extensions by
/// [`correlation_id_layer`](crate::middleware::correlation_id_layer) so that
/// handler logs and the response header agree. Falls back to the
/// `X-Correlation-ID` header, then to a new UUID v4.
#[derive(Debug, Clone, Copy)]
pub struct CorrelationId(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for CorrelationId
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(id) = parts.extensions.get::<Uuid>() {
            return Ok(Self(*id));
        }

        let correlation_id = parts
            .headers
            .get(CORRELATION_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| Uuid::parse_str(s).ok())
            .unwrap_or_else(Uuid::new_v4);

        Ok(Self(correlation_id))
    }
}

/// Client IP address.
///
/// # Priority
///
/// 1. `X-Forwarded-For` (first IP in the list)
/// 2. `X-Real-IP`
/// 3. Loopback
#[derive(Debug, Clone, Copy)]
pub struct ClientIp(pub IpAddr);

#[async_trait]
impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(extract_client_ip(&parts.headers)))
    }
}

/// JSON request body.
///
/// Same as [`axum::Json`], except that a missing or wrong content type,
/// malformed JSON or a missing field is answered with `400 BAD_REQUEST` and
/// the `{code, message}` body instead of axum's plain-text 415/422.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(AppError::bad_request(rejection.body_text())),
        }
    }
}

/// Optional JSON request body.
///
/// An empty (or all-whitespace) body yields `None`. Anything else must be a
/// valid `T`; otherwise the request is rejected with `400 BAD_REQUEST`.
#[derive(Debug, Clone, Default)]
pub struct OptionalJsonBody<T>(pub Option<T>);

#[async_trait]
impl<T, S> FromRequest<S> for OptionalJsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| AppError::bad_request(rejection.body_text()))?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self(None));
        }

        match Json::<T>::from_bytes(&bytes) {
            Ok(Json(value)) => Ok(Self(Some(value))),
            Err(rejection) => Err(AppError::bad_request(rejection.body_text())),
        }
    }
}

/// Extract client IP from proxy headers.
fn extract_client_ip(headers: &HeaderMap) -> IpAddr {
    let forwarded = headers
        .get("X-Forwarded-For")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .and_then(|first| first.trim().parse::<IpAddr>().ok());

    if let Some(ip) = forwarded {
        return ip;
    }

    headers
        .get("X-Real-IP")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<IpAddr>().ok())
        .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST))
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use axum::http::Request;

    #[tokio::test]
    async fn test_correlation_id_from_header() {
        let uuid = Uuid::new_v4();
        let req = Request::builder()
            .header("X-Correlation-ID", uuid.to_string())
            .body(())
            .expect("Valid request");

        let (mut parts, ()) = req.into_parts();
        let correlation_id = CorrelationId::from_request_parts(&mut parts, &())
            .await
            .expect("Should extract");

        assert_eq!(correlation_id.0, uuid);
    }

    #[tokio::test]
    async fn test_correlation_id_prefers_extension() {
        let from_layer = Uuid::new_v4();
        let req = Request::builder()
            .header("X-Correlation-ID", Uuid::new_v4().to_string())
            .body(())
            .expect("Valid request");

        let (mut parts, ()) = req.into_parts();
        parts.extensions.insert(from_layer);
        let correlation_id = CorrelationId::from_request_parts(&mut parts, &())
            .await
            .expect("Should extract");

        assert_eq!(correlation_id.0, from_layer);
    }

    #[tokio::test]
    async fn test_correlation_id_generates_new() {
        let req = Request::builder().body(()).expect("Valid request");

        let (mut parts, ()) = req.into_parts();
        let correlation_id = CorrelationId::from_request_parts(&mut parts, &())
            .await
            .expect("Should extract");

        assert_ne!(correlation_id.0, Uuid::nil());
    }

    #[tokio::test]
    async fn test_client_ip_from_x_forwarded_for() {
        let req = Request::builder()
            .header("X-Forwarded-For", "203.0.113.1, 198.51.100.1")
            .body(())
            .expect("Valid request");

        let (mut parts, ()) = req.into_parts();
        let client_ip = ClientIp::from_request_parts(&mut parts, &())
            .await
            .expect("Should extract");

        assert_eq!(client_ip.0.to_string(), "203.0.113.1");
    }

    #[tokio::test]
    async fn test_client_ip_from_x_real_ip() {
        let req = Request::builder()
            .header("X-Real-IP", "198.51.100.42")
            .body(())
            .expect("Valid request");

        let (mut parts, ()) = req.into_parts();
        let client_ip = ClientIp::from_request_parts(&mut parts, &())
            .await
            .expect("Should extract");

        assert_eq!(client_ip.0.to_string(), "198.51.100.42");
    }

    #[tokio::test]
    async fn test_client_ip_fallback() {
        let req = Request::builder().body(()).expect("Valid request");

        let (mut parts, ()) = req.into_parts();
        let client_ip = ClientIp::from_request_parts(&mut parts, &())
            .await
            .expect("Should extract");

        assert_eq!(client_ip.0.to_string(), "127.0.0.1");
    }

    #[derive(Debug, serde::Deserialize)]
    struct Login {
        email: String,
        code: String,
    }

    fn json_request(body: &'static str) -> axum::extract::Request {
        Request::builder()
            .method("POST")
            .header("Content-Type", "application/json")
            .body(axum::body::Body::from(body))
            .expect("Valid request")
    }

    #[tokio::test]
    async fn test_json_body_parses_valid_json() {
        let req = json_request(r#"{"email": "a@b.com", "code": "123456"}"#);

        let JsonBody(login) = JsonBody::<Login>::from_request(req, &())
            .await
            .expect("Should extract");

        assert_eq!(login.email, "a@b.com");
        assert_eq!(login.code, "123456");
    }

    #[tokio::test]
    async fn test_json_body_missing_field_is_bad_request() {
        let req = json_request(r#"{"email": "a@b.com"}"#);

        let err = JsonBody::<Login>::from_request(req, &())
            .await
            .expect_err("Missing field must be rejected");

        assert_eq!(err.status(), axum::http::StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_json_body_without_content_type_is_bad_request() {
        let req = Request::builder()
            .method("POST")
            .body(axum::body::Body::from(r#"{"email": "a@b.com", "code": "1"}"#))
            .expect("Valid request");

        let err = JsonBody::<Login>::from_request(req, &())
            .await
            .expect_err("Missing content type must be rejected");

        assert_eq!(err.status(), axum::http::StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_optional_json_body_empty_is_none() {
        let req = Request::builder()
            .method("POST")
            .body(axum::body::Body::empty())
            .expect("Valid request");

        let OptionalJsonBody(login) = OptionalJsonBody::<Login>::from_request(req, &())
            .await
            .expect("Should extract");

        assert!(login.is_none());
    }

    #[tokio::test]
    async fn test_optional_json_body_mistyped_is_bad_request() {
        let req = json_request(r#"{"email": "a@b.com", "code": 111}"#);

        let err = OptionalJsonBody::<Login>::from_request(req, &())
            .await
            .expect_err("Mistyped field must be rejected");

        assert_eq!(err.status(), axum::http::StatusCode::BAD_REQUEST);
    }
}
