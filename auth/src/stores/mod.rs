//! Storage implementations.
//!
//! - **One-time code store** (Redis) - ephemeral codes with TTL, atomic
//!   issuance (`SET NX EX`) and redemption (`GETDEL`)
//! - **Database** (PostgreSQL) - users, events, credentials and the
//!   attendance ledger, with uniqueness enforced by the schema

pub mod otc_redis;
#[cfg(feature = "postgres")]
pub mod postgres;

// Re-exports
pub use otc_redis::RedisOtcStore;
#[cfg(feature = "postgres")]
pub use postgres::PostgresDatabase;
