//! # ProofPass
//!
//! Email one-time-code login, session tokens and context-bound event
//! credentials, with an attendance ledger that accepts each credential
//! nullifier once per event.
//!
//! ## Features
//!
//! - **Passwordless**: 6-digit codes, single use, 60 second lifetime
//! - **Stateless sessions**: HS256 tokens checked against an injected clock
//! - **Context binding**: every credential names the one event it is valid for
//! - **Atomic uniqueness**: codes, attendances and credentials rely on
//!   single-statement store primitives, never read-then-write
//! - **Testable**: every collaborator is a trait with an in-memory mock
//!
//! ## Architecture
//!
//! ```text
//! HTTP handler ─► ProofPass<B> ─► service ─► RequestContext::run(collaborator call)
//!                                   │
//!                                   └─► OtcStore / CodeNotifier / ContextRegistry /
//!                                       CredentialIssuer / repositories
//! ```
//!
//! A [`Backend`](services::Backend) names the concrete collaborators;
//! production binds Redis, PostgreSQL and the HTTP issuer, tests bind
//! [`mocks::MockBackend`].
//!
//! ## Example: login
//!
//! ```rust,ignore
//! use proofpass_auth::mocks::MockEnvironment;
//!
//! let env = MockEnvironment::new(Arc::new(SystemClock));
//! let proofpass = env.proofpass(MockEnvironment::settings())?;
//! let ctx = proofpass.context(Uuid::new_v4());
//!
//! proofpass.otc().request_code(&ctx, "a@b.com").await?;
//! let code = env.notifier.last_code_for("a@b.com").unwrap();
//!
//! let outcome = proofpass.login(&ctx, "a@b.com", &code).await?;
//! let claims = proofpass.authenticate(&outcome.token)?;
//! ```

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]

// Public modules
pub mod config;
pub mod constants;
pub mod error;
pub mod providers;
pub mod services;
pub mod state;
pub mod stores;
pub mod utils;

// Mock providers (test-utils feature)
#[cfg(any(test, feature = "test-utils"))]
pub mod mocks;

// HTTP handlers (axum feature)
#[cfg(feature = "axum")]
pub mod handlers;
#[cfg(feature = "axum")]
pub mod router;

// Re-export main types for convenience
pub use config::{CredentialConfig, EventConfig, OtcConfig, SessionConfig};
pub use error::{ProofPassError, Result};
pub use services::{Backend, Collaborators, LoginOutcome, ProofPass, Settings};
pub use state::{ContextId, CredentialKind, Event, EventId, User, UserId};

#[cfg(feature = "axum")]
pub use router::proofpass_router;
