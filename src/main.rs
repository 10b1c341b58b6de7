//! minitwit-db: bootstraps the minitwit database and runs ad-hoc queries.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use minitwit_sqlite::config::{DEFAULT_DB_PATH, DEFAULT_SCHEMA_PATH};
use minitwit_sqlite::{Database, SchemaOutcome, SqliteConfig};

/// Initialize the minitwit SQLite database.
#[derive(Debug, Parser)]
#[command(name = "minitwit-db", version, about)]
struct Cli {
    /// Database file.
    #[arg(long, default_value = DEFAULT_DB_PATH)]
    db: PathBuf,

    /// Schema resource, relative to the working directory.
    #[arg(long, default_value = DEFAULT_SCHEMA_PATH)]
    schema: PathBuf,

    /// How long to wait on a locked database, in milliseconds (at most 2147483647).
    #[arg(long, default_value_t = 5000)]
    busy_timeout_ms: u64,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run a query after initialization and print the rows as JSON.
    Query {
        sql: String,
        /// Positional parameters, bound as text.
        args: Vec<String>,
    },
    /// Print the id of a user.
    UserId { username: String },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = SqliteConfig::new(cli.db, cli.schema)
        .with_busy_timeout(Duration::from_millis(cli.busy_timeout_ms));

    let db = Database::open(&config).context("Error connecting to the database")?;

    let outcome = db
        .initialize_schema(&config.schema_path)
        .context("Error initializing the database")?;
    match outcome {
        SchemaOutcome::Applied => println!("Database initialized successfully."),
        SchemaOutcome::AlreadyInitialized => println!("Database already initialized."),
    }

    match cli.command {
        None => {}
        Some(Command::Query { sql, args }) => {
            let rows = db
                .query_rows(&sql, rusqlite::params_from_iter(args))
                .context("Error running query")?;
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        Some(Command::UserId { username }) => match db.user_id(&username)? {
            Some(id) => println!("{id}"),
            None => println!("not found"),
        },
    }

    db.close().context("Error closing the database")?;
    Ok(())
}
