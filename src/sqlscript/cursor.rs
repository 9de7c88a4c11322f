//! Script execution cursor
//!
//! Defines the contract the script runner drives, plus the production
//! implementation over a live MySQL connection. Keeping the runner behind a
//! trait keeps the drain/fail-fast logic independent of the driver and
//! testable without a server.

use mysql_async::prelude::Queryable;
use mysql_async::{Conn, Opts, OptsBuilder};

use crate::config::DatabaseConfig;

/// One database cursor as the script runner sees it: execute a statement,
/// consume whatever result sets it produced, and control the enclosing
/// transaction.
#[allow(async_fn_in_trait)]
pub trait ScriptCursor {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Execute a single SQL statement.
    async fn execute(&mut self, statement: &str) -> Result<(), Self::Error>;

    /// Fetch and discard all rows of the pending result set. Drivers may
    /// legally fail here when nothing is pending; callers treat failures as
    /// benign.
    async fn fetch_all_rows(&mut self) -> Result<(), Self::Error>;

    /// Advance to the next result set, returning `true` while one remains.
    async fn advance_to_next_result_set(&mut self) -> Result<bool, Self::Error>;

    /// Commit the current transaction.
    async fn commit(&mut self) -> Result<(), Self::Error>;

    /// Roll back the current transaction.
    async fn rollback(&mut self) -> Result<(), Self::Error>;
}

/// Production cursor over a plain `mysql_async` connection.
///
/// Autocommit is switched off on connect so each script file forms one
/// transaction, committed only after every statement in it succeeded.
pub struct MysqlScriptCursor {
    conn: Conn,
}

impl MysqlScriptCursor {
    /// Open a connection from the database settings.
    ///
    /// No schema is selected: bootstrap scripts are expected to create and
    /// `USE` their own database.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, mysql_async::Error> {
        let opts: Opts = OptsBuilder::default()
            .ip_or_hostname(config.host.clone())
            .tcp_port(config.port)
            .user(Some(config.user.clone()))
            .pass(Some(config.password.clone()))
            .into();

        let mut conn = Conn::new(opts).await?;
        conn.query_drop("SET autocommit = 0").await?;
        Ok(Self { conn })
    }

    /// Cleanly close the underlying connection.
    pub async fn disconnect(self) -> Result<(), mysql_async::Error> {
        self.conn.disconnect().await
    }
}

impl ScriptCursor for MysqlScriptCursor {
    type Error = mysql_async::Error;

    async fn execute(&mut self, statement: &str) -> Result<(), Self::Error> {
        // `query_drop` consumes every result set the statement produces
        // before returning; a result set cannot outlive this call because
        // it borrows the connection. An undrained set would poison the
        // connection for the next command.
        self.conn.query_drop(statement).await
    }

    async fn fetch_all_rows(&mut self) -> Result<(), Self::Error> {
        // Nothing is ever pending here: `execute` has already consumed the
        // statement's result sets.
        Ok(())
    }

    async fn advance_to_next_result_set(&mut self) -> Result<bool, Self::Error> {
        Ok(false)
    }

    async fn commit(&mut self) -> Result<(), Self::Error> {
        self.conn.query_drop("COMMIT").await
    }

    async fn rollback(&mut self) -> Result<(), Self::Error> {
        self.conn.query_drop("ROLLBACK").await
    }
}
