//! Database bootstrap binary
//!
//! Applies the PocketCare schema and seed scripts to MySQL. Exit codes:
//! 0 on success, 2 when a required script file is missing, 1 for any other
//! failure (connection or statement execution).

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use pocketcare_api::config::DatabaseConfig;
use pocketcare_api::sqlscript::{apply_sql_files, ApplyOptions};

#[derive(Parser)]
#[command(name = "apply-sql")]
#[command(author, version, about = "Apply PocketCare SQL files to MySQL")]
struct Args {
    /// Path to schema.sql
    #[arg(long, default_value = "database/schema.sql", value_name = "FILE")]
    schema: PathBuf,

    /// Path to seed_data.sql
    #[arg(long, default_value = "database/seed_data.sql", value_name = "FILE")]
    seed: PathBuf,

    /// Skip the seed file
    #[arg(long)]
    no_seed: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Keep driver noise down; progress goes to stdout
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();

    // Database settings come from backend .env or the process environment
    let _ = dotenvy::dotenv();
    let config = match DatabaseConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid database configuration: {e}");
            return ExitCode::from(1);
        }
    };

    let options = ApplyOptions {
        schema_path: args.schema,
        seed_path: args.seed,
        skip_seed: args.no_seed,
    };

    println!("Applying schema: {}", options.schema_path.display());

    match apply_sql_files(&config, &options).await {
        Ok(summary) => {
            println!(
                "Schema applied ({} statements).",
                summary.schema_statements
            );
            if let Some(seeded) = summary.seed_statements {
                println!(
                    "Seed data applied from {} ({seeded} statements).",
                    options.seed_path.display()
                );
            }
            println!("Database update complete.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            let code = e.exit_code();
            // Print the whole cause chain; the statement context alone
            // rarely explains a server-side failure.
            eprintln!("Database update failed: {:#}", anyhow::Error::new(e));
            ExitCode::from(code)
        }
    }
}
