//! Default seed script - loads the sample catalog
//!
//! Run with:
//! ```
//! cargo run -p seed-data --bin seed -- --reset
//! ```

use std::sync::Arc;

use clap::Parser;
use seed_data::prelude::*;
use staffdb::{
    DbConfig, MetricsTimers, config::files, drop_service, open_executor, schema_service,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "seed", about = "Seed the staff database with sample data")]
struct Args {
    /// Drop every table and recreate the schema before seeding.
    #[arg(long)]
    reset: bool,

    /// Fail if any row could not be inserted.
    #[arg(long)]
    strict: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = DbConfig::from_env()?;
    let metrics = MetricsTimers::install()?;
    let mut executor = open_executor(&config, Arc::new(MetricsTimers)).await?;

    if args.reset {
        drop_service::drop_all_tables(&mut executor).await?;
        schema_service::init_schema(&mut executor, config.sql_file(files::INIT_DB)).await?;
    }

    let catalog = SeedCatalog::sample();
    let report = Seeder::new(&mut executor).seed(&catalog).await?;

    tracing::info!("Seed completed!");
    tracing::info!("  Clients: {}/{}", report.clients.succeeded, report.clients.attempted);
    tracing::info!("  Workers: {}/{}", report.workers.succeeded, report.workers.attempted);
    tracing::info!("  Projects: {}/{}", report.projects.succeeded, report.projects.attempted);

    executor.close().await?;
    tracing::debug!("SQL timers:\n{}", metrics.render());

    if args.strict {
        report.into_complete()?;
    }
    Ok(())
}
