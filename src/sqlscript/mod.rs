//! SQL script splitting and application
//!
//! Turns raw `.sql` files into ordered statement sequences and applies them
//! to MySQL with per-file transactional semantics. Used by the `apply-sql`
//! bootstrap binary.

mod apply;
mod cursor;
mod runner;
mod splitter;

pub use apply::{apply_script_file, apply_scripts, apply_sql_files, ApplyError, ApplyOptions, ApplySummary};
pub use cursor::{MysqlScriptCursor, ScriptCursor};
pub use runner::{run_statements, StatementError};
pub use splitter::split_statements;
