mod connection;
mod logging;
mod output;
mod settings;

use std::path::PathBuf;
use std::str::FromStr;
use std::time::{Duration, Instant};

use clap::{Args, Parser, Subcommand, ValueEnum};
use mydump_core::{DumpDocument, Error as CoreError, render};
use mydump_extract::{MySqlConnExecutor, MySqlExecutor, build_dump};
use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions};
use thiserror::Error;
use uuid::Uuid;

use connection::parse_connection;
use settings::DumpSettings;

#[derive(Debug, Error)]
enum CliError {
    #[error("dump error: {0}")]
    Core(#[from] CoreError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("settings error: {0}")]
    Settings(#[from] toml::de::Error),
    #[error("logging error: {0}")]
    Logging(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("unsupported engine: {0}")]
    UnsupportedEngine(String),
}

#[derive(Parser, Debug)]
#[command(name = "mydump", version, about = "Logical backups for MySQL databases")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Dump schema and data of one database.
    Dump(DumpArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Sql,
    Json,
}

#[derive(Args, Debug)]
struct DumpArgs {
    /// Database connection string (flag form).
    #[arg(long, value_name = "CONNECTION_STRING", conflicts_with = "conn_pos")]
    conn: Option<String>,
    /// Database connection string (positional form).
    #[arg(value_name = "CONNECTION_STRING", required_unless_present = "conn")]
    conn_pos: Option<String>,
    /// Database to dump. Defaults to the database named in the connection string.
    #[arg(long)]
    database: Option<String>,
    /// Output file. Writes to stdout when absent.
    #[arg(long)]
    out: Option<PathBuf>,
    /// TOML settings file.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Rows per INSERT statement.
    #[arg(long)]
    batch_size: Option<usize>,
    /// Escape quotes and backslashes in string literals.
    #[arg(long, default_value_t = false)]
    escape_literals: bool,
    /// Table name(s) to include.
    #[arg(long, value_name = "TABLE")]
    table: Vec<String>,
    /// Read all tables inside one consistent-snapshot transaction.
    #[arg(long, default_value_t = false)]
    single_transaction: bool,
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Sql)]
    format: OutputFormat,
    /// Emit logs as JSON lines.
    #[arg(long, default_value_t = false)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();

    match cli.command {
        Command::Dump(args) => run_dump(args).await,
    }
}

async fn run_dump(args: DumpArgs) -> Result<(), CliError> {
    logging::init_logging(args.log_json)?;

    let conn = match (&args.conn, &args.conn_pos) {
        (Some(value), None) | (None, Some(value)) => value.clone(),
        (Some(_), Some(_)) => {
            return Err(CliError::InvalidConfig(
                "use either --conn or positional connection string".to_string(),
            ));
        }
        (None, None) => {
            return Err(CliError::InvalidConfig(
                "connection string is required".to_string(),
            ));
        }
    };

    let info = parse_connection(&conn);
    if !info.is_mysql() {
        return Err(CliError::UnsupportedEngine(info.redacted));
    }

    let settings = merge_settings(&args)?;
    let options = settings.dump_options();
    options.validate()?;

    let database = args
        .database
        .clone()
        .or_else(|| info.database.clone())
        .ok_or_else(|| {
            CliError::InvalidConfig(
                "no database given: pass --database or include it in the connection string"
                    .to_string(),
            )
        })?;

    let run_id = Uuid::new_v4();
    tracing::info!(
        event = "dump_started",
        run_id = %run_id,
        connection = %info.redacted,
        user = ?info.user,
        host = ?info.host,
        port = ?info.port,
        database = %database,
        batch_size = options.batch_size,
        single_transaction = settings.single_transaction
    );
    let timer = Instant::now();

    let connect_options = MySqlConnectOptions::from_str(&conn)?.database(&database);
    let pool = MySqlPoolOptions::new()
        .max_connections(settings.max_connections.max(1))
        .acquire_timeout(Duration::from_secs(settings.acquire_timeout_secs))
        .connect_with(connect_options)
        .await?;

    let doc = if settings.single_transaction {
        let executor = MySqlConnExecutor::acquire(&pool).await?;
        executor.begin_snapshot().await?;
        let result = build_dump(&executor, &database, &options).await;
        let ended = executor.end_snapshot().await;
        close_snapshot(result, ended)?
    } else {
        let executor = MySqlExecutor::new(pool.clone());
        build_dump(&executor, &database, &options).await?
    };
    pool.close().await;

    tracing::info!(
        event = "dump_assembled",
        tables = doc.tables.len(),
        inserts = doc.insert_count()
    );

    let bytes = encode(&doc, args.format)?;
    match &args.out {
        Some(path) => {
            output::write_atomic(path, &bytes)?;
            tracing::info!(event = "dump_written", path = %path.display(), bytes = bytes.len());
        }
        None => output::write_stdout(&bytes)?,
    }

    let duration_ms = timer.elapsed().as_millis() as u64;
    tracing::info!(event = "dump_finished", status = "success", duration_ms = duration_ms);

    Ok(())
}

fn merge_settings(args: &DumpArgs) -> Result<DumpSettings, CliError> {
    let mut settings = match &args.config {
        Some(path) => DumpSettings::load(path)?,
        None => DumpSettings::default(),
    };

    if let Some(batch_size) = args.batch_size {
        settings.batch_size = batch_size;
    }
    if args.escape_literals {
        settings.escape_literals = true;
    }
    if !args.table.is_empty() {
        settings.tables = args.table.clone();
    }
    if args.single_transaction {
        settings.single_transaction = true;
    }

    Ok(settings)
}

/// Combine the dump outcome with the snapshot rollback, keeping the dump's own
/// error when both fail.
fn close_snapshot<T>(
    result: Result<T, CoreError>,
    ended: Result<(), CoreError>,
) -> Result<T, CoreError> {
    match (result, ended) {
        (Ok(value), ended) => ended.map(|()| value),
        (Err(err), Ok(())) => Err(err),
        (Err(err), Err(rollback)) => {
            tracing::warn!(event = "snapshot_rollback_failed", error = %rollback);
            Err(err)
        }
    }
}

fn encode(doc: &DumpDocument, format: OutputFormat) -> Result<Vec<u8>, CliError> {
    match format {
        OutputFormat::Sql => Ok(render(doc).into_bytes()),
        OutputFormat::Json => Ok(serde_json::to_vec_pretty(doc)?),
    }
}
