//! PostgreSQL storage.
//!
//! One [`PostgresDatabase`] implements every repository trait over a shared
//! pool. Queries are built at runtime (`sqlx::query_as`) against the schema in
//! `migrations/`, so the crate builds without a live database.
//!
//! # Example
//!
//! ```no_run
//! use proofpass_auth::stores::PostgresDatabase;
//! use sqlx::PgPool;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = PgPool::connect("postgresql://localhost/proofpass").await?;
//! let db = PostgresDatabase::new(pool);
//! db.migrate().await?;
//! # Ok(())
//! # }
//! ```

mod attendance;
mod credentials;
mod events;
mod users;

use crate::error::{ProofPassError, Result};
use sqlx::PgPool;

/// `PostgreSQL` implementation of every repository.
#[derive(Clone, Debug)]
pub struct PostgresDatabase {
    /// `PostgreSQL` connection pool.
    pool: PgPool,
}

impl PostgresDatabase {
    /// Create a database over an existing pool.
    ///
    /// # Arguments
    ///
    /// * `pool` - `PostgreSQL` connection pool
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run database migrations.
    ///
    /// # Errors
    ///
    /// Returns error if migrations fail.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| ProofPassError::internal("database.migrate", e))?;
        tracing::info!("Database migrations applied");
        Ok(())
    }
}
