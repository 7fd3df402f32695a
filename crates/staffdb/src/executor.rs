//! Single-connection statement executor.
//!
//! Wraps one [`PgConnection`] with update, query and batch execution. Each
//! call is timed under [`UPDATE_TIMER`], [`QUERY_TIMER`] or [`BATCH_TIMER`]
//! and driver failures are translated to [`DbError`].

use std::{path::Path, sync::Arc};

use async_trait::async_trait;
use sqlx::{Connection, PgConnection, postgres::PgRow};
use tracing::{debug, error, info};

use crate::errors::DbError;
use crate::mapper::StatementParams;
use crate::timers::{BATCH_TIMER, QUERY_TIMER, TimerGuard, TimerSink, UPDATE_TIMER};

/// Rows produced by a query, with "no rows" kept distinct from failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome<T> {
    Rows(Vec<T>),
    Empty,
}

impl<T> QueryOutcome<T> {
    pub fn from_rows(rows: Vec<T>) -> Self {
        if rows.is_empty() {
            QueryOutcome::Empty
        } else {
            QueryOutcome::Rows(rows)
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, QueryOutcome::Empty)
    }

    pub fn len(&self) -> usize {
        match self {
            QueryOutcome::Rows(rows) => rows.len(),
            QueryOutcome::Empty => 0,
        }
    }

    /// `None` for an empty result.
    pub fn into_option(self) -> Option<Vec<T>> {
        match self {
            QueryOutcome::Rows(rows) => Some(rows),
            QueryOutcome::Empty => None,
        }
    }

    pub fn into_vec(self) -> Vec<T> {
        self.into_option().unwrap_or_default()
    }
}

/// Result of one batch submission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Non-empty fragments submitted.
    pub statements: usize,
    pub rows_affected: u64,
}

/// Splits a script on `;`, dropping whitespace-only fragments.
///
/// This is a plain character split: a `;` inside a string literal or a
/// comment splits the statement too, so scripts must be trusted and
/// comment-free around semicolons.
pub fn split_statements(sql: &str) -> Vec<&str> {
    sql.split(';')
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .collect()
}

/// Re-joins fragments into one script. Each separator sits on its own line
/// so a fragment ending in a `--` comment cannot swallow it.
pub fn join_statements(fragments: &[&str]) -> String {
    fragments.join("\n;\n")
}

/// Executes a statement with positional parameters already bound.
///
/// This is the seam the insertion service drives; [`SqlExecutor`] is the
/// production implementation.
#[async_trait]
pub trait StatementRunner: Send {
    async fn run_bound(&mut self, sql: &str, params: &StatementParams) -> Result<u64, DbError>;
}

pub struct SqlExecutor {
    conn: PgConnection,
    timers: Arc<dyn TimerSink>,
}

impl SqlExecutor {
    pub fn new(conn: PgConnection, timers: Arc<dyn TimerSink>) -> Self {
        Self { conn, timers }
    }

    /// Runs one data-modifying or DDL statement, returning rows affected.
    pub async fn execute_update(&mut self, sql: &str) -> Result<u64, DbError> {
        info!("Executing SQL update...");
        let _timer = TimerGuard::start(self.timers.as_ref(), UPDATE_TIMER);

        match sqlx::query(sql).persistent(false).execute(&mut self.conn).await {
            Ok(result) => {
                info!("SQL update executed successfully");
                Ok(result.rows_affected())
            }
            Err(e) => {
                error!("Failed to execute SQL update: {e}");
                Err(DbError::statement("update", e))
            }
        }
    }

    /// Runs one SELECT-style statement.
    pub async fn query(&mut self, sql: &str) -> Result<QueryOutcome<PgRow>, DbError> {
        debug!("Executing SQL query...");
        let _timer = TimerGuard::start(self.timers.as_ref(), QUERY_TIMER);

        let rows = sqlx::query(sql)
            .persistent(false)
            .fetch_all(&mut self.conn)
            .await
            .map_err(|e| {
                error!("Failed to execute SQL query: {e}");
                DbError::statement("query", e)
            })?;

        Ok(QueryOutcome::from_rows(rows))
    }

    /// Lenient form of [`Self::query`]: a failed query is logged and
    /// reported as `None`, an empty one as `Some(vec![])`.
    pub async fn execute_query(&mut self, sql: &str) -> Option<Vec<PgRow>> {
        self.query(sql).await.ok().map(QueryOutcome::into_vec)
    }

    /// Splits `sql` with [`split_statements`] and submits the fragments as a
    /// single multi-statement round trip, which Postgres runs as one implicit
    /// transaction. A script with no statements succeeds without a round trip.
    pub async fn execute_batch(&mut self, sql: &str) -> Result<BatchSummary, DbError> {
        info!("Executing SQL batch...");
        let _timer = TimerGuard::start(self.timers.as_ref(), BATCH_TIMER);

        let fragments = split_statements(sql);
        if fragments.is_empty() {
            info!("SQL batch contained no statements");
            return Ok(BatchSummary::default());
        }

        let script = join_statements(&fragments);
        match sqlx::raw_sql(&script).execute(&mut self.conn).await {
            Ok(result) => {
                info!("SQL batch of {} statements executed successfully", fragments.len());
                Ok(BatchSummary {
                    statements: fragments.len(),
                    rows_affected: result.rows_affected(),
                })
            }
            Err(e) => {
                error!("Failed to execute SQL batch: {e}");
                Err(DbError::statement("batch", e))
            }
        }
    }

    /// Reads a SQL file, runs it as one query and maps every row.
    pub async fn query_file<T, F>(
        &mut self,
        path: impl AsRef<Path>,
        mut mapper: F,
    ) -> Result<QueryOutcome<T>, DbError>
    where
        F: FnMut(&PgRow) -> Result<T, sqlx::Error> + Send,
        T: Send,
    {
        let path = path.as_ref();
        let _timer = TimerGuard::start(self.timers.as_ref(), QUERY_TIMER);

        let sql = tokio::fs::read_to_string(path).await.map_err(|e| {
            error!("Failed to read SQL file {}: {e}", path.display());
            DbError::io(path, e)
        })?;

        debug!("Executing SQL query from {}...", path.display());
        let rows = sqlx::query(&sql)
            .persistent(false)
            .fetch_all(&mut self.conn)
            .await
            .map_err(|e| {
                error!("Failed to execute SQL query from {}: {e}", path.display());
                DbError::statement("query", e)
            })?;

        let mapped = rows
            .iter()
            .map(&mut mapper)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| {
                error!("Failed to map rows from {}: {e}", path.display());
                DbError::statement("query", e)
            })?;

        Ok(QueryOutcome::from_rows(mapped))
    }

    /// Lenient form of [`Self::query_file`]. An empty result, a missing file
    /// and a failed query all come back as `None`; failures are logged with
    /// `error_message`.
    pub async fn execute_query_file<T, F>(
        &mut self,
        path: impl AsRef<Path>,
        error_message: &str,
        mapper: F,
    ) -> Option<Vec<T>>
    where
        F: FnMut(&PgRow) -> Result<T, sqlx::Error> + Send,
        T: Send,
    {
        match self.query_file(path, mapper).await {
            Ok(outcome) => outcome.into_option(),
            Err(e) => {
                error!("{error_message}: {e}");
                None
            }
        }
    }

    /// Closes the connection, logging the outcome.
    pub async fn close(self) -> Result<(), DbError> {
        match self.conn.close().await {
            Ok(()) => {
                info!("Connection closed successfully");
                Ok(())
            }
            Err(e) => {
                error!("Failed to close the connection: {e}");
                Err(DbError::Connection(e))
            }
        }
    }
}

#[async_trait]
impl StatementRunner for SqlExecutor {
    async fn run_bound(&mut self, sql: &str, params: &StatementParams) -> Result<u64, DbError> {
        let _timer = TimerGuard::start(self.timers.as_ref(), UPDATE_TIMER);

        let query = params
            .values()
            .iter()
            .fold(sqlx::query(sql), |query, param| param.bind_to(query));

        let result = query
            .execute(&mut self.conn)
            .await
            .map_err(|e| DbError::statement("insert", e))?;

        Ok(result.rows_affected())
    }
}
