//! Database connection management
//!
//! Builds the MySQL connection pool and provides small row-access helpers
//! shared by the route handlers.

pub mod queries;

use mysql_async::prelude::{FromValue, Queryable};
use mysql_async::{Opts, OptsBuilder, Pool, PoolConstraints, PoolOpts, Row};
use tracing::info;

use crate::config::DatabaseConfig;
use crate::error::AppError;

/// Create a connection pool from database settings.
pub fn create_pool(config: &DatabaseConfig) -> Pool {
    let constraints = PoolConstraints::new(1, config.max_pool_size).unwrap_or_default();

    let opts: Opts = OptsBuilder::default()
        .ip_or_hostname(config.host.clone())
        .tcp_port(config.port)
        .user(Some(config.user.clone()))
        .pass(Some(config.password.clone()))
        .db_name(Some(config.database.clone()))
        .pool_opts(PoolOpts::default().with_constraints(constraints))
        .into();

    Pool::new(opts)
}

/// Verify the pool can reach the server before the router starts serving.
pub async fn ping(pool: &Pool) -> Result<(), AppError> {
    let mut conn = pool.get_conn().await?;
    conn.query_drop("SELECT 1").await?;
    info!("Database connection verified");
    Ok(())
}

/// Read a column by name, treating NULL and unconvertible values as `None`.
pub(crate) fn col<T: FromValue>(row: &Row, name: &str) -> Option<T> {
    match row.get_opt::<T, _>(name) {
        Some(Ok(value)) => Some(value),
        _ => None,
    }
}
