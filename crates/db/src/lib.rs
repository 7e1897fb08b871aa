//! Postgres access layer: pool construction, embedded migrations, row
//! models, and repositories.

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

pub mod models;
pub mod repositories;

/// Shared connection pool handle.
pub type DbPool = PgPool;

/// Upper bound on concurrent connections. A stalled backend can hold at
/// most this many; everything else queues on acquire.
const MAX_CONNECTIONS: u32 = 10;

/// How long an acquire may wait for a free connection.
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);

/// Idle connections are dropped after this long; the floor is zero.
const IDLE_TIMEOUT: Duration = Duration::from_secs(30);

/// Create a bounded connection pool.
///
/// The pool is the only shared mutable in-process state, so it is capped
/// and carries acquire/idle timeouts; a stalled backend cannot starve it
/// indefinitely.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .min_connections(0)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .idle_timeout(IDLE_TIMEOUT)
        .connect(database_url)
        .await
}

/// Verify the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    tracing::debug!("database health check passed");
    Ok(())
}

/// Apply the embedded schema migrations.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
