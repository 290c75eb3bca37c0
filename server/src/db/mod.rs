//! Database Layer
//!
//! `PostgreSQL` connection pool, migrations and the store error type shared by
//! every persistence backend.
//!
//! Advisory Lock Seed Registry
//! - 61 = `role_grant_primary` (serializes primary-role replacement per owner/target pair)
//!   - Called from: server/src/roles/queries.rs

mod error;

use std::time::Duration;

use anyhow::Result;
pub use error::{StoreError, StoreResult};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Create `PostgreSQL` connection pool with health configuration.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        // Keep minimum connections warm to prevent cold-start latency
        .min_connections(2)
        .max_connections(20)
        // Surface pool exhaustion as a store timeout instead of hanging
        .acquire_timeout(Duration::from_secs(5))
        .idle_timeout(Duration::from_secs(600))
        .test_before_acquire(true)
        .connect(database_url)
        .await?;

    info!("Connected to PostgreSQL");
    Ok(pool)
}

/// Run database migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("Database migrations completed");
    Ok(())
}
