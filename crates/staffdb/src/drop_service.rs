//! Table teardown.

use std::path::Path;

use serde::Serialize;
use sqlx::Row;
use tracing::{error, info};

use crate::errors::DbError;
use crate::executor::{BatchSummary, SqlExecutor};
use crate::schema_service::run_sql_file;

const LIST_TABLES: &str = "SELECT tablename FROM pg_tables WHERE schemaname = current_schema()";

/// Tables handled by [`drop_all_tables`].
#[derive(Debug, Default, Clone, Serialize)]
pub struct DropSummary {
    pub dropped: Vec<String>,
    pub failed: Vec<String>,
}

/// Quotes an identifier for interpolation into DDL.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

pub fn drop_table_sql(table: &str) -> String {
    format!("DROP TABLE IF EXISTS {} CASCADE", quote_ident(table))
}

/// Drops every table in the current schema.
///
/// Discovery failure is fatal. A table that fails to drop is logged and
/// listed in the summary; the remaining tables are still dropped.
pub async fn drop_all_tables(executor: &mut SqlExecutor) -> Result<DropSummary, DbError> {
    let tables = executor
        .query(LIST_TABLES)
        .await?
        .into_vec()
        .iter()
        .map(|row| row.try_get::<String, _>("tablename"))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| {
            error!("Failed to list tables: {e}");
            DbError::statement("query", e)
        })?;

    let mut summary = DropSummary::default();
    for table in tables {
        match executor.execute_update(&drop_table_sql(&table)).await {
            Ok(_) => {
                info!("Table '{table}' dropped successfully.");
                summary.dropped.push(table);
            }
            Err(e) => {
                error!("Failed to drop table '{table}': {e}");
                summary.failed.push(table);
            }
        }
    }

    Ok(summary)
}

/// Runs a drop script as one batch.
pub async fn drop_tables_from_file(
    executor: &mut SqlExecutor,
    path: impl AsRef<Path>,
) -> Result<BatchSummary, DbError> {
    let path = path.as_ref();
    info!("Dropping tables from {}", path.display());
    run_sql_file(executor, path).await
}
