//! Collaborator providers.
//!
//! This module defines traits for every external dependency of the core:
//! the one-time-code cache, the code notifier, the on-chain context registry,
//! the credential issuer and the relational repositories. Services depend on
//! these traits; the server wires in concrete implementations.
//!
//! ```text
//!  OtcAuthenticator ──► OtcStore (Redis)         CodeNotifier (SMTP / console)
//!  ContextBinder ─────► ContextRegistry (keccak, off-chain)
//!  CredentialOrchestrator ─► CredentialIssuer (HTTP)
//!  every service ─────► repositories (PostgreSQL)
//! ```
//!
//! This enables:
//! - **Testing**: Use mocks (in-memory, deterministic)
//! - **Production**: Use real services (PostgreSQL, Redis, SMTP, issuer)

pub mod console_notifier;
pub mod context_registry;
pub mod http_issuer;
pub mod issuer;
pub mod keccak_registry;
pub mod notifier;
pub mod otc_store;
pub mod repository;
pub mod smtp_notifier;

// Re-export provider traits
pub use console_notifier::ConsoleCodeNotifier;
pub use context_registry::ContextRegistry;
pub use http_issuer::HttpCredentialIssuer;
pub use issuer::{CredentialBody, CredentialHeader, CredentialIssuer, CredentialType, IssueRequest};
pub use keccak_registry::KeccakContextRegistry;
pub use notifier::CodeNotifier;
pub use otc_store::OtcStore;
pub use repository::{
    AttendanceRepository, Database, EmailCredentialRepository, EventAdminRepository,
    EventRepository, RegistrationRepository, TicketCredentialRepository, UserRepository,
};
pub use smtp_notifier::SmtpCodeNotifier;
