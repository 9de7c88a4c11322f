//! Script application
//!
//! File-level orchestration for the database bootstrap: apply the schema
//! script, then (optionally) the seed script, each as one committed unit.
//! A failing statement rolls back the in-flight file and aborts the run.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use super::cursor::{MysqlScriptCursor, ScriptCursor};
use super::runner::run_statements;
use super::splitter::split_statements;
use crate::config::DatabaseConfig;

/// Which script files to apply, and whether seeding is wanted.
#[derive(Debug, Clone)]
pub struct ApplyOptions {
    pub schema_path: PathBuf,
    pub seed_path: PathBuf,
    pub skip_seed: bool,
}

/// Statement counts per applied file.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ApplySummary {
    pub schema_statements: usize,
    pub seed_statements: Option<usize>,
}

/// Everything that can go wrong while applying scripts.
///
/// `MissingFile` is detected before any database work and maps to exit
/// code 2; the rest map to exit code 1.
#[derive(Debug, Error)]
pub enum ApplyError<E = mysql_async::Error>
where
    E: std::error::Error + Send + Sync + 'static,
{
    #[error("script file not found: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("failed to read {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to connect to MySQL")]
    Connect(#[source] E),

    #[error("failed executing {} statement #{}: {}", .path.display(), .index, .preview)]
    Statement {
        path: PathBuf,
        index: usize,
        preview: String,
        #[source]
        source: E,
    },

    #[error("database error")]
    Database(#[source] E),
}

impl<E> ApplyError<E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    /// Process exit code for this failure: 2 for a missing input file,
    /// 1 for everything else.
    pub fn exit_code(&self) -> u8 {
        match self {
            ApplyError::MissingFile(_) => 2,
            _ => 1,
        }
    }
}

/// Apply a single script file on the given cursor, without committing.
///
/// The file is read as UTF-8 (invalid sequences are replaced rather than
/// fatal), stripped of any BOM, split into statements, and executed in
/// order. Returns the number of statements executed.
pub async fn apply_script_file<C: ScriptCursor>(
    cursor: &mut C,
    path: &Path,
) -> Result<usize, ApplyError<C::Error>> {
    let raw = std::fs::read(path).map_err(|source| ApplyError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let script = String::from_utf8_lossy(&raw);

    let statements = split_statements(&script);
    run_statements(cursor, &statements)
        .await
        .map_err(|err| ApplyError::Statement {
            path: path.to_path_buf(),
            index: err.index,
            preview: err.preview,
            source: err.source,
        })
}

/// Apply schema then seed on an open cursor, committing after each file.
///
/// The seed file is never attempted unless the schema file committed. On a
/// statement failure the in-flight file's work is rolled back before the
/// error propagates.
pub async fn apply_scripts<C: ScriptCursor>(
    cursor: &mut C,
    options: &ApplyOptions,
) -> Result<ApplySummary, ApplyError<C::Error>> {
    let mut summary = ApplySummary::default();

    info!(path = %options.schema_path.display(), "applying schema");
    summary.schema_statements = apply_file_atomically(cursor, &options.schema_path).await?;
    info!(statements = summary.schema_statements, "schema applied");

    if !options.skip_seed {
        info!(path = %options.seed_path.display(), "applying seed data");
        summary.seed_statements = Some(apply_file_atomically(cursor, &options.seed_path).await?);
        info!("seed data applied");
    }

    Ok(summary)
}

async fn apply_file_atomically<C: ScriptCursor>(
    cursor: &mut C,
    path: &Path,
) -> Result<usize, ApplyError<C::Error>> {
    match apply_script_file(cursor, path).await {
        Ok(count) => {
            cursor.commit().await.map_err(ApplyError::Database)?;
            Ok(count)
        }
        Err(err) => {
            // Best effort: the connection may already be gone, and the
            // original failure is the one worth reporting.
            let _ = cursor.rollback().await;
            Err(err)
        }
    }
}

/// Full bootstrap entry point: check inputs, connect, apply, disconnect.
///
/// File existence is verified for the schema and (unless skipped) the seed
/// before any connection is opened.
pub async fn apply_sql_files(
    config: &DatabaseConfig,
    options: &ApplyOptions,
) -> Result<ApplySummary, ApplyError> {
    if !options.schema_path.exists() {
        return Err(ApplyError::MissingFile(options.schema_path.clone()));
    }
    if !options.skip_seed && !options.seed_path.exists() {
        return Err(ApplyError::MissingFile(options.seed_path.clone()));
    }

    let mut cursor = MysqlScriptCursor::connect(config)
        .await
        .map_err(ApplyError::Connect)?;

    let result = apply_scripts(&mut cursor, options).await;
    let _ = cursor.disconnect().await;
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Debug, Error)]
    #[error("simulated failure")]
    struct FakeError;

    #[derive(Default)]
    struct RecordingCursor {
        executed: Vec<String>,
        fail_on_statement: Option<String>,
        commits: usize,
        rollbacks: usize,
    }

    impl ScriptCursor for RecordingCursor {
        type Error = FakeError;

        async fn execute(&mut self, statement: &str) -> Result<(), FakeError> {
            if self.fail_on_statement.as_deref() == Some(statement) {
                return Err(FakeError);
            }
            self.executed.push(statement.to_string());
            Ok(())
        }

        async fn fetch_all_rows(&mut self) -> Result<(), FakeError> {
            Ok(())
        }

        async fn advance_to_next_result_set(&mut self) -> Result<bool, FakeError> {
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

    /// Unique throwaway script file under the system temp directory.
    fn write_script(contents: &str) -> PathBuf {
        static COUNTER: AtomicU32 = AtomicU32::new(0);
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        let path = std::env::temp_dir().join(format!(
            "pocketcare-apply-test-{}-{}.sql",
            std::process::id(),
            n
        ));
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn options(schema: PathBuf, seed: PathBuf, skip_seed: bool) -> ApplyOptions {
        ApplyOptions {
            schema_path: schema,
            seed_path: seed,
            skip_seed,
        }
    }

    #[tokio::test]
    async fn applies_schema_then_seed_with_a_commit_each() {
        let schema = write_script("CREATE TABLE a (id INT);\nCREATE TABLE b (id INT);");
        let seed = write_script("INSERT INTO a VALUES (1);");
        let mut cursor = RecordingCursor::default();

        let summary = apply_scripts(&mut cursor, &options(schema.clone(), seed.clone(), false))
            .await
            .unwrap();

        assert_eq!(summary.schema_statements, 2);
        assert_eq!(summary.seed_statements, Some(1));
        assert_eq!(cursor.commits, 2);
        assert_eq!(cursor.rollbacks, 0);
        assert_eq!(
            cursor.executed,
            vec![
                "CREATE TABLE a (id INT)",
                "CREATE TABLE b (id INT)",
                "INSERT INTO a VALUES (1)"
            ]
        );

        let _ = std::fs::remove_file(schema);
        let _ = std::fs::remove_file(seed);
    }

    #[tokio::test]
    async fn schema_failure_rolls_back_and_skips_seed() {
        let schema = write_script("CREATE TABLE a (id INT);\nBROKEN;\nCREATE TABLE c (id INT);");
        let seed = write_script("INSERT INTO a VALUES (1);");
        let mut cursor = RecordingCursor {
            fail_on_statement: Some("BROKEN".to_string()),
            ..Default::default()
        };

        let err = apply_scripts(&mut cursor, &options(schema.clone(), seed.clone(), false))
            .await
            .unwrap_err();

        match err {
            ApplyError::Statement { path, index, preview, .. } => {
                assert_eq!(path, schema);
                assert_eq!(index, 2);
                assert_eq!(preview, "BROKEN");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(cursor.executed, vec!["CREATE TABLE a (id INT)"]);
        assert_eq!(cursor.commits, 0);
        assert_eq!(cursor.rollbacks, 1);

        let _ = std::fs::remove_file(schema);
        let _ = std::fs::remove_file(seed);
    }

    #[tokio::test]
    async fn no_seed_skips_the_seed_file_entirely() {
        let schema = write_script("CREATE TABLE a (id INT);");
        let missing_seed = PathBuf::from("/nonexistent/seed_data.sql");
        let mut cursor = RecordingCursor::default();

        let summary = apply_scripts(&mut cursor, &options(schema.clone(), missing_seed, true))
            .await
            .unwrap();

        assert_eq!(summary.schema_statements, 1);
        assert_eq!(summary.seed_statements, None);
        assert_eq!(cursor.commits, 1);

        let _ = std::fs::remove_file(schema);
    }

    #[tokio::test]
    async fn comment_only_file_commits_trivially() {
        let schema = write_script("-- nothing here\n/* at all */\n");
        let mut cursor = RecordingCursor::default();

        let summary = apply_scripts(&mut cursor, &options(schema.clone(), schema.clone(), true))
            .await
            .unwrap();

        assert_eq!(summary.schema_statements, 0);
        assert!(cursor.executed.is_empty());
        assert_eq!(cursor.commits, 1);

        let _ = std::fs::remove_file(schema);
    }

    #[tokio::test]
    async fn bom_and_comments_are_stripped_before_execution() {
        let schema = write_script("\u{feff}-- header\nCREATE TABLE a (id INT);");
        let mut cursor = RecordingCursor::default();

        apply_scripts(&mut cursor, &options(schema.clone(), schema.clone(), true))
            .await
            .unwrap();

        assert_eq!(cursor.executed, vec!["CREATE TABLE a (id INT)"]);

        let _ = std::fs::remove_file(schema);
    }

    #[tokio::test]
    async fn missing_schema_file_fails_before_any_database_work() {
        let opts = options(
            PathBuf::from("/nonexistent/schema.sql"),
            PathBuf::from("/nonexistent/seed_data.sql"),
            false,
        );
        // A connection to this host:port would fail; the file check must
        // trigger first.
        let config = DatabaseConfig::default();

        let err = apply_sql_files(&config, &opts).await.unwrap_err();
        match &err {
            ApplyError::MissingFile(path) => {
                assert_eq!(path, &PathBuf::from("/nonexistent/schema.sql"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.exit_code(), 2);
    }

    #[tokio::test]
    async fn exit_codes_follow_the_process_contract() {
        let missing: ApplyError<FakeError> = ApplyError::MissingFile(PathBuf::from("x.sql"));
        assert_eq!(missing.exit_code(), 2);

        let connect: ApplyError<FakeError> = ApplyError::Connect(FakeError);
        assert_eq!(connect.exit_code(), 1);

        let statement: ApplyError<FakeError> = ApplyError::Statement {
            path: PathBuf::from("x.sql"),
            index: 3,
            preview: "BROKEN".into(),
            source: FakeError,
        };
        assert_eq!(statement.exit_code(), 1);
    }
}
