//! Mock context registry for testing.

use crate::error::{ProofPassError, Result};
use crate::providers::{ContextRegistry, KeccakContextRegistry};
use crate::state::ContextId;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Mock registry.
///
/// Derives ids with the same function as [`KeccakContextRegistry`] and counts
/// calls. `register_context` always fails, so a test that reaches it fails
/// loudly.
#[derive(Debug, Clone, Default)]
pub struct MockContextRegistry {
    calculations: Arc<AtomicUsize>,
    registrations: Arc<AtomicUsize>,
}

impl MockContextRegistry {
    /// Create a new mock registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `calculate_context_id` calls.
    #[must_use]
    pub fn calculations(&self) -> usize {
        self.calculations.load(Ordering::SeqCst)
    }

    /// Number of `register_context` calls.
    #[must_use]
    pub fn registrations(&self) -> usize {
        self.registrations.load(Ordering::SeqCst)
    }
}

impl ContextRegistry for MockContextRegistry {
    async fn calculate_context_id(&self, canonical: &str) -> Result<ContextId> {
        self.calculations.fetch_add(1, Ordering::SeqCst);
        Ok(KeccakContextRegistry::derive(canonical))
    }

    async fn register_context(&self, _canonical: &str) -> Result<ContextId> {
        self.registrations.fetch_add(1, Ordering::SeqCst);
        Err(ProofPassError::internal(
            "registry.register_context",
            "registration is not available in tests",
        ))
    }
}
