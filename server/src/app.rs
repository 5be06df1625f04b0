//! HTTP application assembly.

use axum::{Router, routing::get};
use proofpass_auth::proofpass_router;
use proofpass_auth::providers::{HttpCredentialIssuer, KeccakContextRegistry};
use proofpass_auth::services::{Backend, ProofPass};
use proofpass_auth::stores::{PostgresDatabase, RedisOtcStore};
use proofpass_web::handlers::health_check;
use proofpass_web::{correlation_id_layer, cors_layer};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::notifier::LoginNotifier;

/// Collaborators used in production.
pub struct ProductionBackend;

impl Backend for ProductionBackend {
    type Otc = RedisOtcStore;
    type Notifier = LoginNotifier;
    type Db = PostgresDatabase;
    type Registry = KeccakContextRegistry;
    type Issuer = HttpCredentialIssuer;
}

/// Build the application router.
///
/// `/health` at the root, the API under `/v1`.
pub fn build_router<B: Backend>(proofpass: Arc<ProofPass<B>>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/v1", proofpass_router(proofpass))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
        .layer(correlation_id_layer())
}
