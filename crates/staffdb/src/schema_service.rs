//! Schema setup and bulk population from SQL scripts.

use std::path::Path;

use tracing::{error, info};

use crate::errors::DbError;
use crate::executor::{BatchSummary, SqlExecutor};

/// Reads a script and submits it as one batch.
pub async fn run_sql_file(
    executor: &mut SqlExecutor,
    path: impl AsRef<Path>,
) -> Result<BatchSummary, DbError> {
    let path = path.as_ref();
    let sql = tokio::fs::read_to_string(path).await.map_err(|e| {
        error!("Failed to read SQL file {}: {e}", path.display());
        DbError::io(path, e)
    })?;

    executor.execute_batch(&sql).await
}

/// Creates the tables described by the schema script.
pub async fn init_schema(
    executor: &mut SqlExecutor,
    path: impl AsRef<Path>,
) -> Result<BatchSummary, DbError> {
    let path = path.as_ref();
    info!("Initialising schema from {}", path.display());
    let summary = run_sql_file(executor, path).await?;
    info!("Schema initialised ({} statements)", summary.statements);
    Ok(summary)
}

/// Inserts rows from a populate script.
pub async fn insert_data(
    executor: &mut SqlExecutor,
    path: impl AsRef<Path>,
) -> Result<BatchSummary, DbError> {
    let path = path.as_ref();
    info!("Populating database from {}", path.display());
    let summary = run_sql_file(executor, path).await?;
    info!(
        "Populated database ({} statements, {} rows)",
        summary.statements, summary.rows_affected
    );
    Ok(summary)
}
