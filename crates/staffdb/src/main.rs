use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use staffdb::{
    DbConfig, DbError, SqlExecutor, TimerRegistry, config::files, drop_service, open_executor,
    query_service, schema_service,
};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "staffdb",
    about = "Run schema, populate, drop and report SQL against the staff database"
)]
struct Cli {
    /// JSON config file; when absent settings come from the environment.
    #[arg(long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Overrides STAFFDB_SQL_DIR.
    #[arg(long, global = true)]
    sql_dir: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create the worker, client and project tables.
    Init,
    /// Insert the sample rows from the populate script.
    Populate,
    /// Drop tables: every table in the current schema, or those in the drop script.
    Drop {
        #[arg(long)]
        from_file: bool,
    },
    /// Run a report query and print its rows as JSON.
    Query { report: Report },
}

#[derive(Clone, Copy, ValueEnum)]
enum Report {
    MaxSalaryWorker,
    MaxProjectsClient,
    LongestProject,
    YoungestEldestWorkers,
}

fn init_logging() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn print_rows<T: Serialize>(rows: Option<Vec<T>>) -> anyhow::Result<()> {
    match rows {
        Some(rows) => println!("{}", serde_json::to_string_pretty(&rows)?),
        None => println!("[]"),
    }
    Ok(())
}

/// Runs one subcommand against an open executor.
async fn run(
    command: Command,
    executor: &mut SqlExecutor,
    config: &DbConfig,
) -> anyhow::Result<()> {
    match command {
        Command::Init => {
            schema_service::init_schema(executor, config.sql_file(files::INIT_DB)).await?;
        }
        Command::Populate => {
            schema_service::insert_data(executor, config.sql_file(files::POPULATE_DB)).await?;
        }
        Command::Drop { from_file: true } => {
            drop_service::drop_tables_from_file(executor, config.sql_file(files::DROP_TABLES))
                .await?;
        }
        Command::Drop { from_file: false } => {
            let summary = drop_service::drop_all_tables(executor).await?;
            tracing::info!(
                "Dropped {} tables, {} failed",
                summary.dropped.len(),
                summary.failed.len()
            );
        }
        Command::Query { report } => match report {
            Report::MaxSalaryWorker => {
                print_rows(query_service::find_max_salary_workers(executor, config).await)?
            }
            Report::MaxProjectsClient => {
                print_rows(query_service::find_max_projects_clients(executor, config).await)?
            }
            Report::LongestProject => {
                print_rows(query_service::find_longest_projects(executor, config).await)?
            }
            Report::YoungestEldestWorkers => {
                print_rows(query_service::find_youngest_eldest_workers(executor, config).await)?
            }
        },
    }
    Ok(())
}

/// Command failures take precedence; a failed close is reported otherwise.
fn finish(outcome: anyhow::Result<()>, closed: Result<(), DbError>) -> anyhow::Result<()> {
    outcome?;
    closed?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => DbConfig::from_json_file(path)?,
        None => DbConfig::from_env()?,
    };
    if let Some(dir) = cli.sql_dir {
        config = config.with_sql_dir(dir);
    }

    let timers = TimerRegistry::new();
    let mut executor = open_executor(&config, Arc::new(timers.clone())).await?;

    let outcome = run(cli.command, &mut executor, &config).await;
    let closed = executor.close().await;

    for (name, stats) in timers.snapshot() {
        tracing::debug!(
            "{name}: {} calls, {:?} total, {:?} max",
            stats.count,
            stats.total,
            stats.max
        );
    }

    finish(outcome, closed)
}
