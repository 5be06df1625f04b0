//! # ProofPass Core
//!
//! Primitives shared by every ProofPass crate.
//!
//! - [`environment`]: the `Clock` abstraction, so that expiry logic (one-time
//!   codes, session tokens, credential validity windows) can be tested without
//!   sleeping.
//! - [`context`]: the per-request [`RequestContext`](context::RequestContext)
//!   that is passed explicitly through every call chain. It carries the
//!   correlation id used in log spans and the deadline that bounds every call
//!   to an external collaborator.

// Re-export commonly used types
pub use chrono::{DateTime, Utc};

/// Environment module - injected dependencies that are not collaborators.
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    ///
    /// # Examples
    ///
    /// ```
    /// use proofpass_core::environment::{Clock, SystemClock};
    ///
    /// let clock = SystemClock;
    /// let before = clock.now();
    /// assert!(clock.now() >= before);
    /// ```
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Production clock backed by the system time.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }
}

/// Request context - explicit structured context for one inbound request.
pub mod context {
    use std::future::Future;
    use std::time::Duration;
    use tokio::time::Instant;
    use uuid::Uuid;

    /// Default budget for a single request.
    pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

    /// Raised when a boundary call does not complete before the request deadline.
    #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
    #[error("operation `{operation}` cancelled: request deadline exceeded")]
    pub struct DeadlineExceeded {
        /// Name of the collaborator call that was cut off.
        pub operation: &'static str,
    }

    /// Per-request context.
    ///
    /// One value is created per inbound request and handed by reference to
    /// every service method. There is no ambient logger: service spans record
    /// [`correlation_id`](Self::correlation_id) as a field.
    #[derive(Debug, Clone)]
    pub struct RequestContext {
        correlation_id: Uuid,
        deadline: Instant,
    }

    impl RequestContext {
        /// Create a context whose deadline is `timeout` from now.
        #[must_use]
        pub fn new(correlation_id: Uuid, timeout: Duration) -> Self {
            Self {
                correlation_id,
                deadline: Instant::now() + timeout,
            }
        }

        /// Create a context with a fresh correlation id and the default timeout.
        #[must_use]
        pub fn background() -> Self {
            Self::new(Uuid::new_v4(), DEFAULT_REQUEST_TIMEOUT)
        }

        /// Correlation id of the request.
        #[must_use]
        pub const fn correlation_id(&self) -> Uuid {
            self.correlation_id
        }

        /// Absolute deadline of the request.
        #[must_use]
        pub const fn deadline(&self) -> Instant {
            self.deadline
        }

        /// Time left before the deadline (zero once it has passed).
        #[must_use]
        pub fn remaining(&self) -> Duration {
            self.deadline.saturating_duration_since(Instant::now())
        }

        /// Run a collaborator call under the request deadline.
        ///
        /// The call is never retried. If the deadline passes first, the future is
        /// dropped and a [`DeadlineExceeded`] is converted into the caller's
        /// error type.
        ///
        /// # Errors
        ///
        /// Returns the call's own error, or `E::from(DeadlineExceeded)` when the
        /// deadline is exceeded.
        pub async fn run<T, E, F>(&self, operation: &'static str, call: F) -> Result<T, E>
        where
            F: Future<Output = Result<T, E>>,
            E: From<DeadlineExceeded>,
        {
            match tokio::time::timeout_at(self.deadline, call).await {
                Ok(result) => result,
                Err(_) => {
                    tracing::warn!(
                        operation = operation,
                        correlation_id = %self.correlation_id,
                        "Collaborator call cancelled at request deadline"
                    );
                    Err(E::from(DeadlineExceeded { operation }))
                }
            }
        }
    }
}

pub use context::{DeadlineExceeded, RequestContext};
pub use environment::{Clock, SystemClock};

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use uuid::Uuid;

    #[derive(Debug, PartialEq)]
    enum TestError {
        Deadline(&'static str),
        Failed,
    }

    impl From<DeadlineExceeded> for TestError {
        fn from(err: DeadlineExceeded) -> Self {
            Self::Deadline(err.operation)
        }
    }

    #[tokio::test]
    async fn test_run_passes_through_result() {
        let ctx = RequestContext::new(Uuid::new_v4(), Duration::from_secs(5));

        let ok: Result<u8, TestError> = ctx.run("fast", async { Ok(7) }).await;
        assert_eq!(ok, Ok(7));

        let err: Result<u8, TestError> = ctx.run("failing", async { Err(TestError::Failed) }).await;
        assert_eq!(err, Err(TestError::Failed));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_cancels_at_deadline() {
        let ctx = RequestContext::new(Uuid::new_v4(), Duration::from_millis(50));

        let result: Result<(), TestError> = ctx
            .run("slow_call", async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(())
            })
            .await;

        assert_eq!(result, Err(TestError::Deadline("slow_call")));
        assert_eq!(ctx.remaining(), Duration::ZERO);
    }

    #[test]
    fn test_system_clock_moves_forward() {
        let clock = SystemClock;
        let first = clock.now();
        assert!(clock.now() >= first);
    }
}
