//! ProofPass router composition.
//!
//! Composes all handlers into a single Axum router.

use crate::handlers::{events, user};
use crate::services::{Backend, ProofPass};
use axum::{
    Router,
    routing::{get, post, put},
};
use std::sync::Arc;

/// Create the ProofPass router.
///
/// # Routes
///
/// ## User
/// - `POST /user/request-verification-code` - Send a one-time code
/// - `POST /user/login` - Redeem a code, get a session token
/// - `GET /user/me` - Current user *(session)*
/// - `PUT /user/me` - Set identity fields once *(session)*
/// - `GET /user/me/email-credential` - Stored email credential *(session)*
/// - `PUT /user/me/email-credential` - Store email credential *(session)*
/// - `GET /user/me/ticket-credentials` - Stored ticket credentials *(session)*
/// - `PUT /user/me/ticket-credential` - Store a ticket credential *(session)*
/// - `POST /user/me/request-email-credential` - Sign an email credential *(session)*
///
/// ## Events
/// - `GET /events` - List events
/// - `POST /events` - Create an event *(session)*
/// - `GET /events/:id` - Event detail
/// - `PUT /events/:id` - Update an event *(session, event admin)*
/// - `POST /events/:id/request-ticket-credential` - Sign a ticket credential *(session)*
/// - `POST /events/:id/attendance` - Record attendance *(admin code)*
///
/// # Example
///
/// ```rust,ignore
/// let proofpass = Arc::new(ProofPass::new(collaborators, settings)?);
///
/// let app = Router::new()
///     .route("/health", get(health_check))
///     .nest("/v1", proofpass_router(proofpass))
///     .layer(TraceLayer::new_for_http());
/// ```
pub fn proofpass_router<B: Backend>(proofpass: Arc<ProofPass<B>>) -> Router {
    Router::new()
        // User routes
        .route("/user/request-verification-code", post(user::request_verification_code::<B>))
        .route("/user/login", post(user::login::<B>))
        .route("/user/me", get(user::get_me::<B>).put(user::update_me::<B>))
        .route(
            "/user/me/email-credential",
            get(user::get_email_credential::<B>).put(user::put_email_credential::<B>),
        )
        .route("/user/me/ticket-credentials", get(user::list_ticket_credentials::<B>))
        .route("/user/me/ticket-credential", put(user::put_ticket_credential::<B>))
        .route(
            "/user/me/request-email-credential",
            post(user::request_email_credential::<B>),
        )
        // Event routes
        .route("/events", get(events::list_events::<B>).post(events::create_event::<B>))
        .route("/events/:id", get(events::get_event::<B>).put(events::update_event::<B>))
        .route(
            "/events/:id/request-ticket-credential",
            post(events::request_ticket_credential::<B>),
        )
        .route("/events/:id/attendance", post(events::record_attendance::<B>))
        .with_state(proofpass)
}
