//! Code notifier trait.

use crate::error::Result;
use chrono::{DateTime, Utc};

/// Delivers verification codes to the owner of an email address.
///
/// Delivery is fire-and-forget from the core's point of view; a failure is
/// surfaced as an internal error and the pending code is withdrawn.
pub trait CodeNotifier: Send + Sync {
    /// Send `code` to `to`, valid until `expires_at`.
    ///
    /// # Errors
    ///
    /// Returns error if the message cannot be built or delivered.
    fn send_code(
        &self,
        to: &str,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}
