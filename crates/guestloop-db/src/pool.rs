//! Connection pool construction.

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

use crate::error::DbError;

/// Default maximum pool size.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Default time to wait for a free connection.
pub const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;

/// Open a connection pool against `database_url`.
///
/// # Errors
///
/// Returns [`DbError::ConnectionFailed`] when the database cannot be reached.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<PgPool, DbError> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections.max(1))
        .acquire_timeout(Duration::from_secs(DEFAULT_ACQUIRE_TIMEOUT_SECS))
        .connect(database_url)
        .await
        .map_err(DbError::ConnectionFailed)?;

    info!(max_connections, "Database connection established");
    Ok(pool)
}
