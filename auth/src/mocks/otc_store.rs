//! Mock one-time code store for testing.

use crate::error::{ProofPassError, Result};
use crate::providers::OtcStore;
use chrono::{DateTime, Utc};
use proofpass_core::Clock;
use proofpass_core::SystemClock;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// In-memory code store.
///
/// Expiry is evaluated against the injected clock, so tests can advance a
/// [`ManualClock`](proofpass_testing::ManualClock) past the TTL instead of
/// sleeping. Check-and-set and fetch-and-delete happen under one lock.
#[derive(Clone)]
pub struct MockOtcStore {
    entries: Arc<Mutex<HashMap<String, (String, DateTime<Utc>)>>>,
    clock: Arc<dyn Clock>,
    failing: Arc<Mutex<bool>>,
    latency: Arc<Mutex<Option<Duration>>>,
}

impl MockOtcStore {
    /// Create a store on the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create a store evaluating expiry against `clock`.
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            clock,
            failing: Arc::new(Mutex::new(false)),
            latency: Arc::new(Mutex::new(None)),
        }
    }

    /// Make every subsequent call fail (simulates a cache outage).
    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock().unwrap_or_else(PoisonError::into_inner) = failing;
    }

    /// Delay every subsequent call by `latency` (simulates a network round trip).
    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock().unwrap_or_else(PoisonError::into_inner) = Some(latency);
    }

    /// The live value under `key`, without consuming it.
    #[must_use]
    pub fn peek(&self, key: &str) -> Option<String> {
        let now = self.clock.now();
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .filter(|(_, expires_at)| *expires_at > now)
            .map(|(value, _)| value.clone())
    }

    /// Number of stored entries, live or expired.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    async fn check_available(&self, operation: &'static str) -> Result<()> {
        let latency = *self.latency.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        if *self.failing.lock().unwrap_or_else(PoisonError::into_inner) {
            return Err(ProofPassError::internal(operation, "cache unavailable"));
        }
        Ok(())
    }
}

impl Default for MockOtcStore {
    fn default() -> Self {
        Self::new()
    }
}

impl OtcStore for MockOtcStore {
    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> Result<bool> {
        self.check_available("otc_store.set_if_absent").await?;
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| ProofPassError::internal("otc_store.set_if_absent", e))?;
        let now = self.clock.now();

        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if entries.get(key).is_some_and(|(_, expires_at)| *expires_at > now) {
            return Ok(false);
        }

        entries.insert(key.to_string(), (value.to_string(), now + ttl));
        Ok(true)
    }

    async fn get_and_delete(&self, key: &str) -> Result<Option<String>> {
        self.check_available("otc_store.get_and_delete").await?;
        let now = self.clock.now();

        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries
            .remove(key)
            .filter(|(_, expires_at)| *expires_at > now)
            .map(|(value, _)| value))
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        self.check_available("otc_store.exists").await?;
        Ok(self.peek(key).is_some())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.check_available("otc_store.delete").await?;
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}
