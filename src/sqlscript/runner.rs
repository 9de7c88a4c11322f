//! Script runner
//!
//! Executes split statements in order against a [`ScriptCursor`], draining
//! result sets between statements and aborting on the first failure.

use thiserror::Error;

use super::cursor::ScriptCursor;

/// How much of a failing statement is echoed back in errors. Seed files can
/// carry multi-kilobyte INSERTs; logs get a bounded preview instead.
const PREVIEW_LIMIT: usize = 200;

/// A statement failed while a script was being applied.
#[derive(Debug, Error)]
#[error("statement #{index} failed: {preview}")]
pub struct StatementError<E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    /// 1-based position of the failing statement within the script.
    pub index: usize,
    /// Truncated text of the failing statement.
    pub preview: String,
    #[source]
    pub source: E,
}

/// Execute `statements` in order, failing fast.
///
/// Each statement is executed exactly once; its result sets are drained so
/// the connection is ready for the next command. The first execution error
/// aborts the run with the statement's 1-based index and a bounded preview
/// of its text. Returns the number of statements executed.
pub async fn run_statements<C: ScriptCursor>(
    cursor: &mut C,
    statements: &[String],
) -> Result<usize, StatementError<C::Error>> {
    let mut executed = 0;

    for (idx, stmt) in statements.iter().enumerate() {
        let stmt = stmt.trim();
        if stmt.is_empty() {
            continue;
        }

        if let Err(source) = cursor.execute(stmt).await {
            return Err(StatementError {
                index: idx + 1,
                preview: statement_preview(stmt),
                source,
            });
        }
        drain_results(cursor).await;
        executed += 1;
    }

    Ok(executed)
}

/// Consume any pending result sets so the next command on the connection
/// starts clean. Some statements (e.g. EXECUTE of a prepared SELECT)
/// produce rows even when the SQL text is not a plain SELECT.
///
/// Fetch and advance errors are swallowed: they are the normal case for
/// statements that return no rows and must not mask the execution outcome.
async fn drain_results<C: ScriptCursor>(cursor: &mut C) {
    loop {
        let _ = cursor.fetch_all_rows().await;

        match cursor.advance_to_next_result_set().await {
            Ok(true) => continue,
            Ok(false) | Err(_) => break,
        }
    }
}

/// Bounded preview of a statement for error messages.
fn statement_preview(stmt: &str) -> String {
    if stmt.chars().count() > PREVIEW_LIMIT {
        let truncated: String = stmt.chars().take(PREVIEW_LIMIT).collect();
        format!("{truncated}...")
    } else {
        stmt.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error)]
    #[error("simulated failure")]
    struct FakeError;

    /// Scripted cursor that records every call the runner makes.
    #[derive(Default)]
    struct RecordingCursor {
        executed: Vec<String>,
        fail_on: Option<usize>,
        fetch_fails: bool,
        extra_result_sets: usize,
        fetches: usize,
        advances: usize,
        commits: usize,
        rollbacks: usize,
    }

    impl ScriptCursor for RecordingCursor {
        type Error = FakeError;

        async fn execute(&mut self, statement: &str) -> Result<(), FakeError> {
            if self.fail_on == Some(self.executed.len() + 1) {
                return Err(FakeError);
            }
            self.executed.push(statement.to_string());
            Ok(())
        }

        async fn fetch_all_rows(&mut self) -> Result<(), FakeError> {
            self.fetches += 1;
            if self.fetch_fails {
                return Err(FakeError);
            }
            Ok(())
        }

        async fn advance_to_next_result_set(&mut self) -> Result<bool, FakeError> {
            self.advances += 1;
            if self.extra_result_sets > 0 {
                self.extra_result_sets -= 1;
                return Ok(true);
            }
            Ok(false)
        }

        async fn commit(&mut self) -> Result<(), FakeError> {
            self.commits += 1;
            Ok(())
        }

        async fn rollback(&mut self) -> Result<(), FakeError> {
            self.rollbacks += 1;
            Ok(())
        }
    }

    fn statements(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn executes_statements_in_order() {
        let mut cursor = RecordingCursor::default();
        let count = run_statements(&mut cursor, &statements(&["SELECT 1", "SELECT 2"]))
            .await
            .unwrap();

        assert_eq!(count, 2);
        assert_eq!(cursor.executed, vec!["SELECT 1", "SELECT 2"]);
        // Transaction control belongs to the file-level orchestration.
        assert_eq!(cursor.commits, 0);
        assert_eq!(cursor.rollbacks, 0);
    }

    #[tokio::test]
    async fn aborts_on_first_failure_with_index_and_preview() {
        let mut cursor = RecordingCursor {
            fail_on: Some(3),
            ..Default::default()
        };
        let stmts = statements(&["CREATE TABLE a (id INT)", "SELECT 1", "BROKEN SQL", "SELECT 2"]);

        let err = run_statements(&mut cursor, &stmts).await.unwrap_err();

        assert_eq!(err.index, 3);
        assert_eq!(err.preview, "BROKEN SQL");
        // Statements before the failure ran; the one after it never did.
        assert_eq!(cursor.executed.len(), 2);
    }

    #[tokio::test]
    async fn long_statements_are_truncated_in_the_error() {
        let long = format!("INSERT INTO t VALUES ('{}')", "x".repeat(400));
        let mut cursor = RecordingCursor {
            fail_on: Some(1),
            ..Default::default()
        };

        let err = run_statements(&mut cursor, &statements(&[&long]))
            .await
            .unwrap_err();

        assert_eq!(err.preview.chars().count(), PREVIEW_LIMIT + 3);
        assert!(err.preview.ends_with("..."));
        assert!(long.starts_with(err.preview.trim_end_matches("...")));
    }

    #[tokio::test]
    async fn drains_every_result_set() {
        let mut cursor = RecordingCursor {
            extra_result_sets: 2,
            ..Default::default()
        };

        run_statements(&mut cursor, &statements(&["CALL some_proc()"]))
            .await
            .unwrap();

        // One fetch per result set: the initial one plus the two extras.
        assert_eq!(cursor.fetches, 3);
        assert_eq!(cursor.advances, 3);
    }

    #[tokio::test]
    async fn fetch_failures_during_drain_are_swallowed() {
        let mut cursor = RecordingCursor {
            fetch_fails: true,
            ..Default::default()
        };

        let count = run_statements(&mut cursor, &statements(&["UPDATE t SET x = 1"]))
            .await
            .unwrap();

        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn empty_and_blank_statements_are_skipped() {
        let mut cursor = RecordingCursor::default();
        let count = run_statements(&mut cursor, &statements(&["", "   ", "SELECT 1"]))
            .await
            .unwrap();

        assert_eq!(count, 1);
        assert_eq!(cursor.executed, vec!["SELECT 1"]);
    }

    #[tokio::test]
    async fn empty_script_executes_nothing() {
        let mut cursor = RecordingCursor::default();
        let count = run_statements(&mut cursor, &[]).await.unwrap();

        assert_eq!(count, 0);
        assert!(cursor.executed.is_empty());
    }
}
