//! ProofPass services.
//!
//! Each component owns one responsibility and talks to the outside world only
//! through the provider traits:
//!
//! | Service | Responsibility |
//! |---|---|
//! | [`OtcAuthenticator`] | issue and redeem one-time email codes |
//! | [`SessionTokenIssuer`] | sign and validate session tokens |
//! | [`ContextBinder`] | derive event contexts, check requested ones |
//! | [`AttendanceLedger`] | record each `(event, nullifier)` once |
//! | [`CredentialOrchestrator`] | request signed ticket and email credentials |
//! | [`AccountService`] | user record and stored credentials |
//! | [`EventService`] | event catalogue |
//!
//! [`ProofPass`] wires them together over one [`Backend`].

pub mod account;
pub mod attendance;
pub mod context;
pub mod credentials;
pub mod events;
pub mod otc;
pub mod session;

pub use account::AccountService;
pub use attendance::AttendanceLedger;
pub use context::{ContextBinder, bind_context, canonical_context};
pub use credentials::CredentialOrchestrator;
pub use events::EventService;
pub use otc::OtcAuthenticator;
pub use session::{IssuedToken, SessionClaims, SessionTokenIssuer};

use crate::config::{CredentialConfig, EventConfig, OtcConfig, SessionConfig};
use crate::constants::metrics as metric_names;
use crate::error::Result;
use crate::providers::{CodeNotifier, ContextRegistry, CredentialIssuer, Database, OtcStore};
use crate::state::User;
use proofpass_core::{Clock, RequestContext};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// The set of collaborator implementations a deployment runs on.
///
/// Production binds Redis, PostgreSQL, the HTTP issuer and an SMTP or console
/// notifier; tests bind the in-memory mocks.
pub trait Backend: Send + Sync + 'static {
    /// One-time code cache.
    type Otc: OtcStore + Clone + 'static;
    /// Code delivery.
    type Notifier: CodeNotifier + Clone + 'static;
    /// Relational store.
    type Db: Database;
    /// Context registry.
    type Registry: ContextRegistry + Clone + 'static;
    /// Credential issuer.
    type Issuer: CredentialIssuer + Clone + 'static;
}

/// Concrete collaborators for a [`Backend`].
pub struct Collaborators<B: Backend> {
    /// One-time code cache.
    pub otc_store: B::Otc,
    /// Code delivery.
    pub notifier: B::Notifier,
    /// Relational store.
    pub db: B::Db,
    /// Context registry.
    pub registry: B::Registry,
    /// Credential issuer.
    pub issuer: B::Issuer,
    /// Time source.
    pub clock: Arc<dyn Clock>,
}

/// Service settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// One-time codes.
    pub otc: OtcConfig,
    /// Session tokens.
    pub session: SessionConfig,
    /// Credential issuance.
    pub credentials: CredentialConfig,
    /// New events.
    pub events: EventConfig,
    /// Budget of each request.
    pub request_timeout: Duration,
}

impl Settings {
    /// Settings with the given session configuration and defaults elsewhere.
    #[must_use]
    pub fn new(session: SessionConfig) -> Self {
        Self {
            otc: OtcConfig::default(),
            session,
            credentials: CredentialConfig::default(),
            events: EventConfig::default(),
            request_timeout: proofpass_core::context::DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// Result of a successful login.
#[derive(Debug, Clone, Serialize)]
pub struct LoginOutcome {
    /// Session token.
    pub token: String,
    /// The logged-in user (created on first login).
    #[serde(skip)]
    pub user: User,
}

/// The assembled ProofPass service.
pub struct ProofPass<B: Backend> {
    otc: OtcAuthenticator<B::Otc, B::Notifier>,
    sessions: SessionTokenIssuer,
    accounts: AccountService<B::Db>,
    events: EventService<B::Db, B::Registry>,
    attendance: AttendanceLedger<B::Db>,
    credentials: CredentialOrchestrator<B::Db, B::Issuer>,
    request_timeout: Duration,
}

impl<B: Backend> ProofPass<B> {
    /// Assemble the services.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if the session configuration is unusable.
    pub fn new(collaborators: Collaborators<B>, settings: Settings) -> Result<Self> {
        let Collaborators {
            otc_store,
            notifier,
            db,
            registry,
            issuer,
            clock,
        } = collaborators;

        Ok(Self {
            otc: OtcAuthenticator::new(otc_store, notifier, Arc::clone(&clock), settings.otc),
            sessions: SessionTokenIssuer::new(&settings.session, Arc::clone(&clock))?,
            accounts: AccountService::new(db.clone()),
            events: EventService::new(db.clone(), ContextBinder::new(registry), settings.events),
            attendance: AttendanceLedger::new(db.clone()),
            credentials: CredentialOrchestrator::new(db, issuer, clock, settings.credentials),
            request_timeout: settings.request_timeout,
        })
    }

    /// A fresh request context with the configured budget.
    #[must_use]
    pub fn context(&self, correlation_id: Uuid) -> RequestContext {
        RequestContext::new(correlation_id, self.request_timeout)
    }

    /// One-time codes.
    #[must_use]
    pub const fn otc(&self) -> &OtcAuthenticator<B::Otc, B::Notifier> {
        &self.otc
    }

    /// Session tokens.
    #[must_use]
    pub const fn sessions(&self) -> &SessionTokenIssuer {
        &self.sessions
    }

    /// Accounts.
    #[must_use]
    pub const fn accounts(&self) -> &AccountService<B::Db> {
        &self.accounts
    }

    /// Events.
    #[must_use]
    pub const fn events(&self) -> &EventService<B::Db, B::Registry> {
        &self.events
    }

    /// Attendance.
    #[must_use]
    pub const fn attendance(&self) -> &AttendanceLedger<B::Db> {
        &self.attendance
    }

    /// Credential issuance.
    #[must_use]
    pub const fn credentials(&self) -> &CredentialOrchestrator<B::Db, B::Issuer> {
        &self.credentials
    }

    /// Redeem a code, load or create the user and issue a session token.
    ///
    /// # Errors
    ///
    /// - `Validation` for a malformed email or empty code
    /// - `Unauthorized` for a wrong, expired or already used code
    /// - `Internal`/`Cancelled` from the cache or the store
    #[tracing::instrument(
        skip_all,
        name = "proofpass.login",
        fields(correlation_id = %ctx.correlation_id())
    )]
    pub async fn login(&self, ctx: &RequestContext, email: &str, code: &str) -> Result<LoginOutcome> {
        let email = self.otc.redeem_code(ctx, email, code).await?;
        let user = self.accounts.get_or_create_user(ctx, &email).await?;
        let issued = self.sessions.issue(user.id, &user.email)?;

        metrics::counter!(metric_names::LOGINS).increment(1);
        tracing::info!(user_id = %user.id, "User logged in");

        Ok(LoginOutcome {
            token: issued.token,
            user,
        })
    }

    /// Validate a session token.
    ///
    /// # Errors
    ///
    /// Returns `InvalidToken` for a bad, malformed or expired token.
    pub fn authenticate(&self, token: &str) -> Result<SessionClaims> {
        self.sessions.validate(token)
    }
}
