//! Off-chain evaluation of the context registry.
//!
//! The registry contract derives a context id as
//! `uint160(uint256(keccak256(bytes(context))))`. That function is pure, so it
//! is evaluated locally rather than through an RPC round trip.

use crate::error::{ProofPassError, Result};
use crate::providers::context_registry::ContextRegistry;
use crate::state::ContextId;
use alloy_primitives::{U160, keccak256};

/// Context registry evaluated off chain.
///
/// `register_context` needs a signing chain client and is refused.
#[derive(Clone, Copy, Debug, Default)]
pub struct KeccakContextRegistry;

impl KeccakContextRegistry {
    /// Create the registry.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Compute the context id of `canonical`.
    ///
    /// # Examples
    ///
    /// ```
    /// use proofpass_auth::providers::KeccakContextRegistry;
    ///
    /// let a = KeccakContextRegistry::derive("[proofpass.io][e1]DevCon");
    /// let b = KeccakContextRegistry::derive("[proofpass.io][e1]DevCon");
    /// assert_eq!(a, b);
    /// ```
    #[must_use]
    pub fn derive(canonical: &str) -> ContextId {
        let hash = keccak256(canonical.as_bytes());
        let mut low = [0u8; 20];
        low.copy_from_slice(&hash[12..]);
        ContextId::new(U160::from_be_bytes(low).to_string())
    }
}

impl ContextRegistry for KeccakContextRegistry {
    async fn calculate_context_id(&self, canonical: &str) -> Result<ContextId> {
        Ok(Self::derive(canonical))
    }

    async fn register_context(&self, canonical: &str) -> Result<ContextId> {
        tracing::warn!(canonical = %canonical, "On-chain context registration requested");
        Err(ProofPassError::internal(
            "registry.register_context",
            "on-chain registration requires a chain client",
        ))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use alloy_primitives::U256;
    use proptest::prelude::*;

    #[test]
    fn test_matches_truncated_keccak() {
        let canonical = "[proofpass.io][6f1c0f3e-0000-4000-8000-000000000001]ETHGlobal";
        let full = U256::from_be_bytes(keccak256(canonical.as_bytes()).0);
        let mask = (U256::from(1u8) << 160usize) - U256::from(1u8);

        let expected = (full & mask).to_string();
        assert_eq!(KeccakContextRegistry::derive(canonical).as_str(), expected);
    }

    #[tokio::test]
    async fn test_register_is_refused() {
        let registry = KeccakContextRegistry::new();
        let result = registry.register_context("[proofpass.io][x]y").await;
        assert!(matches!(result, Err(ProofPassError::Internal { .. })));
    }

    proptest! {
        #[test]
        fn prop_derivation_is_pure(canonical in ".{0,64}") {
            prop_assert_eq!(
                KeccakContextRegistry::derive(&canonical),
                KeccakContextRegistry::derive(&canonical)
            );
        }
    }
}
