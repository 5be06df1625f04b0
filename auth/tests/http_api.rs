//! HTTP-level tests driving the router with `tower::ServiceExt::oneshot`.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use proofpass_auth::mocks::MockEnvironment;
use proofpass_auth::proofpass_router;
use proofpass_testing::test_clock;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

fn app(env: &MockEnvironment) -> Router {
    let proofpass = env.proofpass(MockEnvironment::settings()).unwrap();
    proofpass_router(Arc::new(proofpass))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn post_json(uri: &str, body: &Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

async fn login(app: &Router, env: &MockEnvironment, email: &str) -> String {
    let (status, _) = send(
        app,
        post_json("/user/request-verification-code", &json!({ "email": email }), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let code = env.notifier.last_code_for(email).unwrap();
    let (status, body) = send(
        app,
        post_json("/user/login", &json!({ "email": email, "code": code }), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

async fn create_event(app: &Router, token: &str) -> Value {
    let start = test_clock_now();
    let (status, body) = send(
        app,
        post_json(
            "/events",
            &json!({
                "name": "DevCon",
                "description": "Developer conference",
                "url": "https://devcon.example.com",
                "admin_code": "secret",
                "start_date": start,
                "end_date": start + chrono::Duration::days(3),
            }),
            Some(token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body
}

fn test_clock_now() -> chrono::DateTime<chrono::Utc> {
    use proofpass_core::Clock;
    test_clock().now()
}

#[tokio::test]
async fn test_login_and_current_user() {
    let env = MockEnvironment::new(Arc::new(test_clock()));
    let app = app(&env);

    let token = login(&app, &env, "a@b.com").await;

    let (status, body) = send(&app, get("/user/me", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "a@b.com");
    assert_eq!(body["identity_commitment"], "");
    assert_eq!(body["is_encrypted"], true);
}

#[tokio::test]
async fn test_protected_routes_require_valid_token() {
    let env = MockEnvironment::new(Arc::new(test_clock()));
    let app = app(&env);

    let (status, body) = send(&app, get("/user/me", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let (status, _) = send(&app, get("/user/me", Some("not-a-jwt"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_wrong_code_is_unauthorized_and_pending_code_rate_limits() {
    let env = MockEnvironment::new(Arc::new(test_clock()));
    let app = app(&env);
    let request_code = || {
        post_json(
            "/user/request-verification-code",
            &json!({ "email": "a@b.com" }),
            None,
        )
    };

    let (status, _) = send(&app, request_code()).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, request_code()).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["code"], "RATE_LIMITED");

    let (status, _) = send(
        &app,
        post_json("/user/login", &json!({ "email": "a@b.com", "code": "000000x" }), None),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        post_json("/user/request-verification-code", &json!({ "email": "nope" }), None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_event_detail_hides_admin_code() {
    let env = MockEnvironment::new(Arc::new(test_clock()));
    let app = app(&env);
    let token = login(&app, &env, "admin@example.com").await;

    let created = create_event(&app, &token).await;
    assert!(created.get("admin_code").is_none());

    let id = created["id"].as_str().unwrap();
    let (status, body) = send(&app, get(&format!("/events/{id}"), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "DevCon");
    assert_eq!(body["context_id"], created["context_id"]);
    assert!(body.get("admin_code").is_none());

    let (status, body) = send(&app, get("/events", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_unknown_event_is_not_found() {
    let env = MockEnvironment::new(Arc::new(test_clock()));
    let app = app(&env);

    let missing = uuid::Uuid::new_v4();
    let (status, body) = send(&app, get(&format!("/events/{missing}"), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_attendance_is_created_then_conflicts() {
    let env = MockEnvironment::new(Arc::new(test_clock()));
    let app = app(&env);
    let token = login(&app, &env, "admin@example.com").await;
    let event = create_event(&app, &token).await;
    let id = event["id"].as_str().unwrap();

    let claim = |admin_code: &str| {
        json!({
            "type": "1",
            "context": event["context_id"],
            "nullifier": "N1",
            "key_id": "0xc4525dA874A6A3877db65e37f21eEc0b41ef9877",
            "admin_code": admin_code,
        })
    };
    let uri = format!("/events/{id}/attendance");

    let (status, _) = send(&app, post_json(&uri, &claim("wrong-code"), None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(&app, post_json(&uri, &claim("secret"), None)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["id"].is_string());

    let (status, body) = send(&app, post_json(&uri, &claim("secret"), None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "CONFLICT");
}

#[tokio::test]
async fn test_ticket_credential_request() {
    let env = MockEnvironment::new(Arc::new(test_clock()));
    let app = app(&env);
    let admin_token = login(&app, &env, "admin@example.com").await;
    let event = create_event(&app, &admin_token).await;
    let id = event["id"].as_str().unwrap();
    let uri = format!("/events/{id}/request-ticket-credential");

    let token = login(&app, &env, "holder@example.com").await;
    let request = Request::builder()
        .method("PUT")
        .uri("/user/me")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(
            json!({
                "identity_commitment": "4242",
                "encrypted_internal_nullifier": "enc-nullifier",
                "encrypted_identity_secret": "enc-secret",
            })
            .to_string(),
        ))
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);

    // Not registered yet
    let (status, _) = send(&app, post_json(&uri, &json!({}), Some(&token))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(env.issuer.call_count(), 0);

    let event_id = id.parse().unwrap();
    env.db.add_registration(event_id, "holder@example.com");

    let (status, body) = send(
        &app,
        post_json(&uri, &json!({ "context_id": "111" }), Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_CONTEXT");

    let (status, body) = send(
        &app,
        post_json(&uri, &json!({ "context_id": event["context_id"] }), Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["credential"].as_str().unwrap().starts_with("signed:"));
    assert!(body["expire_at"].is_string());

    let (status, _) = send(&app, post_json(&uri, &json!({}), Some(&token))).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_malformed_json_bodies_are_bad_request() {
    let env = MockEnvironment::new(Arc::new(test_clock()));
    let app = app(&env);

    let (status, body) = send(&app, post_json("/user/request-verification-code", &json!({}), None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
    assert!(body["message"].as_str().unwrap().contains("email"));
    assert!(env.notifier.sent().is_empty());

    let (status, body) = send(
        &app,
        post_json("/user/login", &json!({ "email": "holder@example.com" }), None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");

    let request = Request::builder()
        .method("POST")
        .uri("/user/request-verification-code")
        .body(Body::from(json!({ "email": "holder@example.com" }).to_string()))
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_attendance_without_nullifier_is_bad_request() {
    let env = MockEnvironment::new(Arc::new(test_clock()));
    let app = app(&env);
    let token = login(&app, &env, "admin@example.com").await;
    let event = create_event(&app, &token).await;
    let id = event["id"].as_str().unwrap();

    let claim = json!({
        "type": "1",
        "context": event["context_id"],
        "key_id": "0xc4525dA874A6A3877db65e37f21eEc0b41ef9877",
        "admin_code": "secret",
    });
    let (status, body) = send(&app, post_json(&format!("/events/{id}/attendance"), &claim, None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_ticket_credential_body_is_optional_but_must_be_valid() {
    let env = MockEnvironment::new(Arc::new(test_clock()));
    let app = app(&env);
    let admin_token = login(&app, &env, "admin@example.com").await;
    let event = create_event(&app, &admin_token).await;
    let id = event["id"].as_str().unwrap();
    let uri = format!("/events/{id}/request-ticket-credential");

    let token = login(&app, &env, "holder@example.com").await;
    let request = Request::builder()
        .method("PUT")
        .uri("/user/me")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(
            json!({
                "identity_commitment": "4242",
                "encrypted_internal_nullifier": "enc-nullifier",
                "encrypted_identity_secret": "enc-secret",
            })
            .to_string(),
        ))
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    env.db.add_registration(id.parse().unwrap(), "holder@example.com");

    // Numeric context id does not deserialize
    let (status, body) = send(&app, post_json(&uri, &json!({ "context_id": 111 }), Some(&token))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
    assert_eq!(env.issuer.call_count(), 0);

    let empty = Request::builder()
        .method("POST")
        .uri(&uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, empty).await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["credential"].as_str().unwrap().starts_with("signed:"));
    assert_eq!(env.issuer.call_count(), 1);
}
