//! Database seeding utilities.

use staffdb::{
    ClientMapper, DbError, InsertSummary, InsertionService, ProjectMapper, StatementRunner,
    WorkerMapper,
};
use thiserror::Error;
use tracing::{info, warn};

use crate::catalog::SeedCatalog;

pub const WORKER_INSERT: &str = "INSERT INTO worker (name, birthday, email, level, salary) \
    VALUES (?, ?, ?, ?, ?) ON CONFLICT DO NOTHING";
pub const CLIENT_INSERT: &str = "INSERT INTO client (name) VALUES (?) ON CONFLICT DO NOTHING";
pub const PROJECT_INSERT: &str = "INSERT INTO project (name, client_id, start_date, finish_date) \
    VALUES (?, ?, ?, ?) ON CONFLICT DO NOTHING";

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Database error: {0}")]
    Database(#[from] DbError),
    #[error("{failed} of {attempted} seed rows failed to insert")]
    Incomplete { attempted: usize, failed: usize },
}

/// Per-table insertion summaries from one seeding pass.
#[derive(Debug, Default)]
pub struct SeedReport {
    pub clients: InsertSummary,
    pub workers: InsertSummary,
    pub projects: InsertSummary,
}

impl SeedReport {
    pub fn attempted(&self) -> usize {
        self.clients.attempted + self.workers.attempted + self.projects.attempted
    }

    pub fn failed(&self) -> usize {
        self.clients.failed + self.workers.failed + self.projects.failed
    }

    /// Turns any per-row failure into an error, for callers that need a complete seed.
    pub fn into_complete(self) -> Result<Self, SeedError> {
        match self.failed() {
            0 => Ok(self),
            failed => Err(SeedError::Incomplete {
                attempted: self.attempted(),
                failed,
            }),
        }
    }
}

/// Loads a [`SeedCatalog`] through the generic insertion service.
pub struct Seeder<'r, R: StatementRunner> {
    runner: &'r mut R,
}

impl<'r, R: StatementRunner> Seeder<'r, R> {
    pub fn new(runner: &'r mut R) -> Self {
        Self { runner }
    }

    /// Seeds clients, workers and projects, in that order.
    ///
    /// Clients go first so that project `client_id`s resolve.
    pub async fn seed(&mut self, catalog: &SeedCatalog) -> Result<SeedReport, SeedError> {
        let clients = self.seed_clients(catalog).await?;
        let workers = self.seed_workers(catalog).await?;
        let projects = self.seed_projects(catalog).await?;

        let report = SeedReport {
            clients,
            workers,
            projects,
        };
        if report.failed() > 0 {
            warn!(
                "Seeding finished with {} of {} rows failing",
                report.failed(),
                report.attempted()
            );
        } else {
            info!("Seeded {} rows", report.attempted());
        }
        Ok(report)
    }

    pub async fn seed_clients(
        &mut self,
        catalog: &SeedCatalog,
    ) -> Result<InsertSummary, SeedError> {
        info!("Seeding {} clients...", catalog.clients().len());
        let summary = InsertionService::new(&mut *self.runner)
            .insert_entities(CLIENT_INSERT, catalog.clients(), &ClientMapper)
            .await?;
        info!("Seeded {} clients", summary.succeeded);
        Ok(summary)
    }

    pub async fn seed_workers(
        &mut self,
        catalog: &SeedCatalog,
    ) -> Result<InsertSummary, SeedError> {
        info!("Seeding {} workers...", catalog.workers().len());
        let summary = InsertionService::new(&mut *self.runner)
            .insert_entities(WORKER_INSERT, catalog.workers(), &WorkerMapper)
            .await?;
        info!("Seeded {} workers", summary.succeeded);
        Ok(summary)
    }

    pub async fn seed_projects(
        &mut self,
        catalog: &SeedCatalog,
    ) -> Result<InsertSummary, SeedError> {
        info!("Seeding {} projects...", catalog.projects().len());
        let summary = InsertionService::new(&mut *self.runner)
            .insert_entities(PROJECT_INSERT, catalog.projects(), &ProjectMapper)
            .await?;
        info!("Seeded {} projects", summary.succeeded);
        Ok(summary)
    }
}
