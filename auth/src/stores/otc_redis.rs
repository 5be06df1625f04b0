//! Redis-based one-time code store.
//!
//! Codes are stored under `proofpass:otc:{email}` (the key is built by the
//! caller) with a Redis TTL. Both state transitions are single commands:
//!
//! - **Issue**: `SET key code NX EX ttl`, so two concurrent requests for the
//!   same email cannot both store a code
//! - **Redeem**: `GETDEL key`, so a code is consumed by the first redemption
//!   attempt whatever its outcome
//!
//! # Example
//!
//! ```no_run
//! use proofpass_auth::stores::RedisOtcStore;
//! use proofpass_auth::providers::OtcStore;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = RedisOtcStore::new("redis://127.0.0.1:6379").await?;
//!
//! let stored = store
//!     .set_if_absent("proofpass:otc:a@b.com", "123456", Duration::from_secs(60))
//!     .await?;
//! assert!(stored);
//!
//! let code = store.get_and_delete("proofpass:otc:a@b.com").await?;
//! assert_eq!(code.as_deref(), Some("123456"));
//! # Ok(())
//! # }
//! ```

use crate::error::{ProofPassError, Result};
use crate::providers::OtcStore;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use std::time::Duration;

/// `Redis`-based code store.
///
/// Clones share the same `ConnectionManager`.
#[derive(Clone)]
pub struct RedisOtcStore {
    conn_manager: ConnectionManager,
}

impl RedisOtcStore {
    /// Connect to `Redis`.
    ///
    /// # Arguments
    ///
    /// * `redis_url` - `Redis` connection URL (e.g., "<redis://127.0.0.1:6379>")
    ///
    /// # Errors
    ///
    /// Returns error if the URL is malformed or the connection fails.
    pub async fn new(redis_url: &str) -> Result<Self> {
        let client = Client::open(redis_url)
            .map_err(|e| ProofPassError::internal("redis.connect", e))?;

        let conn_manager = ConnectionManager::new(client)
            .await
            .map_err(|e| ProofPassError::internal("redis.connect", e))?;

        tracing::info!("RedisOtcStore initialized successfully");

        Ok(Self { conn_manager })
    }
}

impl OtcStore for RedisOtcStore {
    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> Result<bool> {
        let mut conn = self.conn_manager.clone();
        let ttl_seconds = ttl.as_secs().max(1);

        // Nil reply means NX refused the write
        let reply: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("NX")
            .arg("EX")
            .arg(ttl_seconds)
            .query_async(&mut conn)
            .await
            .map_err(|e| ProofPassError::internal("otc_store.set_if_absent", e))?;

        let stored = reply.is_some();
        tracing::debug!(key = key, ttl_seconds = ttl_seconds, stored = stored, "SET NX EX");
        Ok(stored)
    }

    async fn get_and_delete(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.conn_manager.clone();

        let value: Option<String> = conn
            .get_del(key)
            .await
            .map_err(|e| ProofPassError::internal("otc_store.get_and_delete", e))?;

        Ok(value)
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let mut conn = self.conn_manager.clone();

        let exists: bool = conn
            .exists(key)
            .await
            .map_err(|e| ProofPassError::internal("otc_store.exists", e))?;

        Ok(exists)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.conn_manager.clone();

        let deleted: i32 = conn
            .del(key)
            .await
            .map_err(|e| ProofPassError::internal("otc_store.delete", e))?;

        tracing::trace!(key = key, deleted = deleted, "DEL");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore] // Requires Redis running at localhost:6379
    #[allow(clippy::unwrap_used)] // Test code
    async fn test_redis_code_lifecycle() {
        let store = RedisOtcStore::new("redis://127.0.0.1:6379").await.unwrap();
        let key = "proofpass:otc:lifecycle@example.com";
        store.delete(key).await.unwrap();

        assert!(store.set_if_absent(key, "123456", Duration::from_secs(60)).await.unwrap());
        assert!(!store.set_if_absent(key, "654321", Duration::from_secs(60)).await.unwrap());
        assert!(store.exists(key).await.unwrap());

        assert_eq!(store.get_and_delete(key).await.unwrap().as_deref(), Some("123456"));
        assert_eq!(store.get_and_delete(key).await.unwrap(), None);
        assert!(!store.exists(key).await.unwrap());
    }

    #[tokio::test]
    #[ignore] // Requires Redis running
    #[allow(clippy::unwrap_used)] // Test code
    async fn test_redis_code_expiration() {
        let store = RedisOtcStore::new("redis://127.0.0.1:6379").await.unwrap();
        let key = "proofpass:otc:expiring@example.com";
        store.delete(key).await.unwrap();

        store.set_if_absent(key, "123456", Duration::from_secs(1)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert!(!store.exists(key).await.unwrap());
        assert_eq!(store.get_and_delete(key).await.unwrap(), None);
    }
}
