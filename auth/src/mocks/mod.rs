//! Mock provider implementations for testing.
//!
//! This module provides simple, in-memory implementations of all provider traits
//! for use in unit and integration tests, and a [`MockBackend`] binding them
//! together.

pub mod database;
pub mod issuer;
pub mod notifier;
pub mod otc_store;
pub mod registry;

pub use database::MockDatabase;
pub use issuer::MockCredentialIssuer;
pub use notifier::{MockCodeNotifier, SentCode};
pub use otc_store::MockOtcStore;
pub use registry::MockContextRegistry;

use crate::config::SessionConfig;
use crate::error::Result;
use crate::services::{Backend, Collaborators, ProofPass, Settings};
use proofpass_core::Clock;
use std::sync::Arc;

/// Backend made of in-memory mocks.
#[derive(Debug, Clone, Copy)]
pub struct MockBackend;

impl Backend for MockBackend {
    type Otc = MockOtcStore;
    type Notifier = MockCodeNotifier;
    type Db = MockDatabase;
    type Registry = MockContextRegistry;
    type Issuer = MockCredentialIssuer;
}

/// Session secret used by [`MockEnvironment`].
pub const TEST_SESSION_SECRET: &str = "proofpass-test-secret-at-least-32-bytes";

/// Handles to every mock behind one [`ProofPass<MockBackend>`].
///
/// The handles share state with the assembled service, so a test can seed the
/// database, read delivered codes or inspect issuer requests.
#[derive(Clone)]
pub struct MockEnvironment {
    /// Code cache.
    pub otc_store: MockOtcStore,
    /// Code delivery.
    pub notifier: MockCodeNotifier,
    /// Database.
    pub db: MockDatabase,
    /// Context registry.
    pub registry: MockContextRegistry,
    /// Issuer.
    pub issuer: MockCredentialIssuer,
    /// Time source shared by every component.
    pub clock: Arc<dyn Clock>,
}

impl MockEnvironment {
    /// Fresh mocks on `clock`.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            otc_store: MockOtcStore::with_clock(Arc::clone(&clock)),
            notifier: MockCodeNotifier::new(),
            db: MockDatabase::new(),
            registry: MockContextRegistry::new(),
            issuer: MockCredentialIssuer::new(),
            clock,
        }
    }

    /// Default settings with [`TEST_SESSION_SECRET`].
    #[must_use]
    pub fn settings() -> Settings {
        Settings::new(SessionConfig::new(TEST_SESSION_SECRET))
    }

    /// Assemble the service over these mocks.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if `settings` holds an unusable session config.
    pub fn proofpass(&self, settings: Settings) -> Result<ProofPass<MockBackend>> {
        ProofPass::new(
            Collaborators {
                otc_store: self.otc_store.clone(),
                notifier: self.notifier.clone(),
                db: self.db.clone(),
                registry: self.registry.clone(),
                issuer: self.issuer.clone(),
                clock: Arc::clone(&self.clock),
            },
            settings,
        )
    }
}
