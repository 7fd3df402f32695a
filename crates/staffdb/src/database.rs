use std::{str::FromStr, sync::Arc};

use sqlx::{Connection, PgConnection, postgres::PgConnectOptions};
use tracing::{error, info};

use crate::config::DbConfig;
use crate::errors::DbError;
use crate::executor::SqlExecutor;
use crate::timers::TimerSink;

/// Opens a single connection as described by `config`.
pub async fn connect(config: &DbConfig) -> Result<PgConnection, DbError> {
    let mut options = PgConnectOptions::from_str(&config.database_url).map_err(|e| {
        error!("Invalid database URL: {e}");
        DbError::Connection(e)
    })?;

    if let Some(timeout) = config.statement_timeout_ms {
        options = options.options([("statement_timeout", timeout.to_string())]);
    }

    let conn = PgConnection::connect_with(&options).await.map_err(|e| {
        error!("Failed to connect to database: {e}");
        DbError::Connection(e)
    })?;

    info!("Connected to database");
    Ok(conn)
}

/// Opens a connection and wraps it in an executor reporting to `timers`.
pub async fn open_executor(
    config: &DbConfig,
    timers: Arc<dyn TimerSink>,
) -> Result<SqlExecutor, DbError> {
    let conn = connect(config).await?;
    Ok(SqlExecutor::new(conn, timers))
}
