//! Application state management
//!
//! Contains shared state accessible across all handlers. Every handler
//! checks a connection out of the pool and returns it when done; no
//! handler opens its own connection.

use mysql_async::Pool;
use std::sync::Arc;

/// Application state shared across all handlers
pub struct AppState {
    /// MySQL connection pool (required)
    pub db_pool: Pool,
}

impl AppState {
    /// Create new application state around an established pool
    pub fn new(pool: Pool) -> Self {
        Self { db_pool: pool }
    }
}

/// Type alias for shared state
pub type SharedState = Arc<AppState>;
