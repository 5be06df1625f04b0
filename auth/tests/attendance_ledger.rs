//! Integration tests for attendance recording.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use chrono::Duration;
use proofpass_auth::mocks::{MockBackend, MockEnvironment};
use proofpass_auth::state::{AttendanceClaim, NewEvent};
use proofpass_auth::{Event, EventId, ProofPass, ProofPassError};
use proofpass_core::{Clock, RequestContext};
use proofpass_testing::test_clock;
use std::sync::Arc;

const ADMIN_CODE: &str = "secret";

async fn setup() -> (MockEnvironment, ProofPass<MockBackend>, Event) {
    let env = MockEnvironment::new(Arc::new(test_clock()));
    let proofpass = env.proofpass(MockEnvironment::settings()).unwrap();
    let ctx = RequestContext::background();

    let admin = proofpass
        .accounts()
        .get_or_create_user(&ctx, "admin@example.com")
        .await
        .unwrap();

    let start = test_clock().now();
    let event = proofpass
        .events()
        .create(
            &ctx,
            admin.id,
            NewEvent {
                name: "DevCon".to_string(),
                description: "Developer conference".to_string(),
                url: "https://devcon.example.com".to_string(),
                admin_code: ADMIN_CODE.to_string(),
                start_date: start,
                end_date: start + Duration::days(3),
            },
        )
        .await
        .unwrap();

    (env, proofpass, event)
}

fn claim(event: &Event, nullifier: &str, admin_code: &str) -> AttendanceClaim {
    AttendanceClaim {
        credential_type: "1".to_string(),
        context: event.context_id.clone().unwrap().into_inner(),
        nullifier: nullifier.to_string(),
        key_id: "0xc4525dA874A6A3877db65e37f21eEc0b41ef9877".to_string(),
        admin_code: admin_code.to_string(),
    }
}

#[tokio::test]
async fn test_nullifier_is_recorded_once() {
    let (env, proofpass, event) = setup().await;
    let ctx = RequestContext::background();

    let first = proofpass
        .attendance()
        .record(&ctx, event.id, &claim(&event, "N1", ADMIN_CODE))
        .await;
    assert!(first.is_ok());

    let repeat = proofpass
        .attendance()
        .record(&ctx, event.id, &claim(&event, "N1", ADMIN_CODE))
        .await;
    assert!(matches!(repeat, Err(ProofPassError::Conflict(_))));

    assert_eq!(proofpass.attendance().count(&ctx, event.id).await.unwrap(), 1);
    assert_eq!(env.db.attendances(event.id).len(), 1);
}

#[tokio::test]
async fn test_wrong_admin_code_records_nothing() {
    let (env, proofpass, event) = setup().await;
    let ctx = RequestContext::background();

    let result = proofpass
        .attendance()
        .record(&ctx, event.id, &claim(&event, "N2", "wrong-code"))
        .await;

    assert!(matches!(result, Err(ProofPassError::Unauthorized(_))));
    assert!(env.db.attendances(event.id).is_empty());
}

#[tokio::test]
async fn test_unknown_credential_type_is_invalid_request() {
    let (_env, proofpass, event) = setup().await;
    let ctx = RequestContext::background();

    let mut bad_type = claim(&event, "N3", ADMIN_CODE);
    bad_type.credential_type = "2".to_string();

    let result = proofpass.attendance().record(&ctx, event.id, &bad_type).await;
    assert!(matches!(result, Err(ProofPassError::InvalidRequest(_))));
}

#[tokio::test]
async fn test_foreign_context_is_invalid_request() {
    let (_env, proofpass, event) = setup().await;
    let ctx = RequestContext::background();

    let mut foreign = claim(&event, "N4", ADMIN_CODE);
    foreign.context = "111".to_string();

    let result = proofpass.attendance().record(&ctx, event.id, &foreign).await;
    assert!(matches!(result, Err(ProofPassError::InvalidRequest(_))));
}

#[tokio::test]
async fn test_unknown_event_is_checked_before_admin_code() {
    let (_env, proofpass, event) = setup().await;
    let ctx = RequestContext::background();

    let result = proofpass
        .attendance()
        .record(&ctx, EventId::new(), &claim(&event, "N5", "wrong-code"))
        .await;
    assert_eq!(result, Err(ProofPassError::NotFound("event")));
}

#[tokio::test]
async fn test_empty_nullifier_is_validation_error() {
    let (_env, proofpass, event) = setup().await;
    let ctx = RequestContext::background();

    let result = proofpass
        .attendance()
        .record(&ctx, event.id, &claim(&event, "", ADMIN_CODE))
        .await;
    assert!(matches!(result, Err(ProofPassError::Validation(_))));
}

#[tokio::test]
async fn test_store_outage_is_internal() {
    let (env, proofpass, event) = setup().await;
    let ctx = RequestContext::background();

    env.db.set_failing(true);
    let result = proofpass
        .attendance()
        .record(&ctx, event.id, &claim(&event, "N6", ADMIN_CODE))
        .await;
    assert!(matches!(result, Err(ProofPassError::Internal { .. })));
}

#[tokio::test]
async fn test_concurrent_submissions_record_once() {
    let (env, proofpass, event) = setup().await;
    let proofpass = Arc::new(proofpass);

    let mut tasks = tokio::task::JoinSet::new();
    for _ in 0..32 {
        let proofpass = Arc::clone(&proofpass);
        let claim = claim(&event, "N7", ADMIN_CODE);
        let event_id = event.id;
        tasks.spawn(async move {
            let ctx = RequestContext::background();
            proofpass.attendance().record(&ctx, event_id, &claim).await
        });
    }

    let mut recorded = 0;
    let mut conflicts = 0;
    while let Some(result) = tasks.join_next().await {
        match result.unwrap() {
            Ok(_) => recorded += 1,
            Err(ProofPassError::Conflict(_)) => conflicts += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(recorded, 1);
    assert_eq!(conflicts, 31);
    assert_eq!(env.db.attendances(event.id).len(), 1);
}
