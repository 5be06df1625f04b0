//! Context registry trait.

use crate::error::Result;
use crate::state::ContextId;

/// The on-chain context registry, reduced to its two operations.
pub trait ContextRegistry: Send + Sync {
    /// Derive the context id of a canonical context string.
    ///
    /// Pure: the same input always yields the same id, independent of chain
    /// state.
    ///
    /// # Errors
    ///
    /// Returns error if the registry cannot be reached.
    fn calculate_context_id(
        &self,
        canonical: &str,
    ) -> impl std::future::Future<Output = Result<ContextId>> + Send;

    /// Register a canonical context string on chain.
    ///
    /// State-changing. Not used when events are created; contexts are
    /// computed off chain and readable on chain by id.
    ///
    /// # Errors
    ///
    /// Returns error if the registration cannot be submitted.
    fn register_context(
        &self,
        canonical: &str,
    ) -> impl std::future::Future<Output = Result<ContextId>> + Send;
}
