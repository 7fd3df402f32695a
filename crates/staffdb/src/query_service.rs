//! Report queries over the seeded tables.
//!
//! Each report lives in its own SQL file and is run through
//! [`SqlExecutor::execute_query_file`], so a failed or empty report both
//! surface as `None` with the failure logged.

use serde::Serialize;
use sqlx::FromRow;
use time::Date;

use crate::config::{DbConfig, files};
use crate::executor::SqlExecutor;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct MaxSalaryWorker {
    pub name: String,
    pub salary: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct MaxProjectsClient {
    pub name: String,
    pub project_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct LongestProject {
    pub name: String,
    pub month_count: i32,
}

/// `kind` is `YOUNGEST` or `ELDEST`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct YoungestEldestWorker {
    pub kind: String,
    pub name: String,
    pub birthday: Date,
}

pub async fn find_max_salary_workers(
    executor: &mut SqlExecutor,
    config: &DbConfig,
) -> Option<Vec<MaxSalaryWorker>> {
    executor
        .execute_query_file(
            config.sql_file(files::FIND_MAX_SALARY_WORKER),
            "Failed to find workers with the highest salary",
            |row| MaxSalaryWorker::from_row(row),
        )
        .await
}

pub async fn find_max_projects_clients(
    executor: &mut SqlExecutor,
    config: &DbConfig,
) -> Option<Vec<MaxProjectsClient>> {
    executor
        .execute_query_file(
            config.sql_file(files::FIND_MAX_PROJECTS_CLIENT),
            "Failed to find clients with the most projects",
            |row| MaxProjectsClient::from_row(row),
        )
        .await
}

pub async fn find_longest_projects(
    executor: &mut SqlExecutor,
    config: &DbConfig,
) -> Option<Vec<LongestProject>> {
    executor
        .execute_query_file(
            config.sql_file(files::FIND_LONGEST_PROJECT),
            "Failed to find the longest projects",
            |row| LongestProject::from_row(row),
        )
        .await
}

pub async fn find_youngest_eldest_workers(
    executor: &mut SqlExecutor,
    config: &DbConfig,
) -> Option<Vec<YoungestEldestWorker>> {
    executor
        .execute_query_file(
            config.sql_file(files::FIND_YOUNGEST_ELDEST_WORKERS),
            "Failed to find the youngest and eldest workers",
            |row| YoungestEldestWorker::from_row(row),
        )
        .await
}
