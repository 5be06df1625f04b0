//! Context binding.
//!
//! An event's context id is derived once, at creation, from the canonical
//! string `[proofpass.io][{event_id}]{event_name}` and stored verbatim. Every
//! credential request for the event must then carry exactly that id.

use crate::constants::CONTEXT_PREFIX;
use crate::error::{ProofPassError, Result};
use crate::providers::ContextRegistry;
use crate::state::{ContextId, Event, EventId};
use proofpass_core::RequestContext;

/// Derives and checks event contexts.
#[derive(Clone, Debug)]
pub struct ContextBinder<R> {
    registry: R,
}

impl<R: ContextRegistry> ContextBinder<R> {
    /// Create a binder over a registry.
    #[must_use]
    pub const fn new(registry: R) -> Self {
        Self { registry }
    }

    /// Derive the context of an event through the registry's pure function.
    ///
    /// # Returns
    ///
    /// The context id and the canonical string it was derived from.
    ///
    /// # Errors
    ///
    /// Returns `Internal` if the registry fails or `Cancelled` at the deadline.
    pub async fn derive_context_id(
        &self,
        ctx: &RequestContext,
        event_id: EventId,
        event_name: &str,
    ) -> Result<(ContextId, String)> {
        let canonical = canonical_context(event_id, event_name);
        let context_id = ctx
            .run(
                "registry.calculate_context_id",
                self.registry.calculate_context_id(&canonical),
            )
            .await?;

        tracing::debug!(event_id = %event_id, context_id = %context_id, "Derived event context");
        Ok((context_id, canonical))
    }
}

/// Canonical context string of an event.
///
/// ```
/// use proofpass_auth::services::canonical_context;
/// use proofpass_auth::state::EventId;
/// use uuid::Uuid;
///
/// let id = EventId(Uuid::nil());
/// assert_eq!(
///     canonical_context(id, "DevCon"),
///     "[proofpass.io][00000000-0000-0000-0000-000000000000]DevCon"
/// );
/// ```
#[must_use]
pub fn canonical_context(event_id: EventId, event_name: &str) -> String {
    format!("{CONTEXT_PREFIX}[{event_id}]{event_name}")
}

/// Resolve the context a credential for `event` must be bound to.
///
/// # Errors
///
/// - `Validation` if the event has no context
/// - `InvalidContext` if `requested` is present and differs from it
pub fn bind_context(event: &Event, requested: Option<&str>) -> Result<ContextId> {
    let Some(context_id) = event.context_id.as_ref().filter(|c| !c.as_str().is_empty()) else {
        return Err(ProofPassError::Validation(
            "event has no credential context".to_string(),
        ));
    };

    if let Some(requested) = requested {
        if requested != context_id.as_str() {
            tracing::info!(
                event_id = %event.id,
                requested = %requested,
                "Credential context does not match event"
            );
            return Err(ProofPassError::InvalidContext(
                "context does not belong to this event".to_string(),
            ));
        }
    }

    Ok(context_id.clone())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::providers::KeccakContextRegistry;
    use chrono::Utc;

    type Binder = ContextBinder<KeccakContextRegistry>;

    fn event(context_id: Option<&str>) -> Event {
        Event {
            id: EventId::new(),
            name: "DevCon".to_string(),
            description: String::new(),
            url: String::new(),
            admin_code: "secret".to_string(),
            chain_id: "1".to_string(),
            context_id: context_id.map(ContextId::new),
            context_string: String::new(),
            issuer_key_id: String::new(),
            start_date: Utc::now(),
            end_date: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_derivation_is_pure() {
        let binder = Binder::new(KeccakContextRegistry::new());
        let ctx = RequestContext::background();
        let id = EventId::new();

        let first = binder.derive_context_id(&ctx, id, "DevCon").await;
        let second = binder.derive_context_id(&ctx, id, "DevCon").await;
        assert_eq!(first, second);

        let renamed = binder.derive_context_id(&ctx, id, "DevCon 2").await;
        assert_ne!(first, renamed);
    }

    #[test]
    fn test_bind_accepts_matching_or_absent_request() {
        let event = event(Some("42"));
        assert_eq!(bind_context(&event, None), Ok(ContextId::new("42")));
        assert_eq!(bind_context(&event, Some("42")), Ok(ContextId::new("42")));
    }

    #[test]
    fn test_bind_rejects_foreign_context() {
        let event = event(Some("42"));
        assert!(matches!(
            bind_context(&event, Some("43")),
            Err(ProofPassError::InvalidContext(_))
        ));
    }

    #[test]
    fn test_bind_requires_event_context() {
        assert!(matches!(
            bind_context(&event(None), None),
            Err(ProofPassError::Validation(_))
        ));
        assert!(matches!(
            bind_context(&event(Some("")), None),
            Err(ProofPassError::Validation(_))
        ));
    }
}
