//! ProofPass HTTP server.
//!
//! Wires the production collaborators (`PostgreSQL`, Redis, the HTTP credential
//! issuer, SMTP or console code delivery) into [`proofpass_auth::ProofPass`]
//! and serves its router.

pub mod app;
pub mod config;
pub mod notifier;

pub use app::{ProductionBackend, build_router};
pub use config::{Config, ConfigError};
pub use notifier::LoginNotifier;
