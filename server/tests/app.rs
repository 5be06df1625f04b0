//! Router assembly: health, `/v1` nesting, correlation ids and CORS.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use proofpass_auth::mocks::MockEnvironment;
use proofpass_server::build_router;
use proofpass_testing::test_clock;
use proofpass_web::CORRELATION_ID_HEADER;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

fn app() -> (MockEnvironment, Router) {
    let env = MockEnvironment::new(Arc::new(test_clock()));
    let proofpass = env.proofpass(MockEnvironment::settings()).unwrap();
    (env, build_router(Arc::new(proofpass)))
}

#[tokio::test]
async fn test_health_at_root() {
    let (_env, app) = app();

    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"OK");
}

#[tokio::test]
async fn test_api_served_under_v1() {
    let (_env, app) = app();

    let response = app
        .clone()
        .oneshot(Request::get("/v1/events").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(serde_json::from_slice::<Value>(&bytes).unwrap(), json!([]));

    let response = app
        .oneshot(Request::get("/events").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_login_code_request_through_full_stack() {
    let (env, app) = app();

    let response = app
        .oneshot(
            Request::post("/v1/user/request-verification-code")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json!({ "email": "a@b.com" }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(env.notifier.last_code_for("a@b.com").is_some());
}

#[tokio::test]
async fn test_correlation_id_echoed() {
    let (_env, app) = app();
    let correlation_id = "3f2b6c1e-8a4d-4c6b-9f7e-2d1a0b9c8e7f";

    let response = app
        .oneshot(
            Request::get("/health")
                .header(CORRELATION_ID_HEADER, correlation_id)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response.headers().get(CORRELATION_ID_HEADER).unwrap(),
        correlation_id
    );
}

#[tokio::test]
async fn test_cors_preflight_allows_bearer_requests() {
    let (_env, app) = app();

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/v1/user/me")
                .header(header::ORIGIN, "https://app.proofpass.io")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "PUT")
                .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "authorization")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "*"
    );
}
