//! One-time code store trait.

use crate::error::Result;
use std::time::Duration;

/// Key-value store with per-key TTL and atomic fetch-and-delete.
///
/// # Security Requirements
///
/// 1. **Atomic issuance**: `set_if_absent()` must check and write in one step
///    (`Redis`: `SET key value NX EX ttl`), otherwise two concurrent requests
///    for the same email both pass the rate limit.
/// 2. **Atomic redemption**: `get_and_delete()` must fetch and remove in one
///    step (`Redis`: `GETDEL`), which makes every code single-use whether or
///    not the guess was right.
/// 3. **Expiration**: entries past their TTL are indistinguishable from
///    entries that never existed.
pub trait OtcStore: Send + Sync {
    /// Store `value` under `key` for `ttl`, unless a live entry exists.
    ///
    /// # Returns
    ///
    /// `true` if the value was stored, `false` if `key` was already taken.
    ///
    /// # Errors
    ///
    /// Returns error if the storage operation fails.
    fn set_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> impl std::future::Future<Output = Result<bool>> + Send;

    /// Atomically fetch and delete the entry under `key`.
    ///
    /// # Errors
    ///
    /// Returns error if the storage operation fails.
    fn get_and_delete(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = Result<Option<String>>> + Send;

    /// Check whether a live entry exists.
    ///
    /// # Errors
    ///
    /// Returns error if the storage operation fails.
    fn exists(&self, key: &str) -> impl std::future::Future<Output = Result<bool>> + Send;

    /// Delete the entry under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns error if the storage operation fails.
    fn delete(&self, key: &str) -> impl std::future::Future<Output = Result<()>> + Send;
}
