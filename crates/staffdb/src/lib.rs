//! SQL file execution and typed entity insertion for the worker / client /
//! project database.
//!
//! The pieces, leaves first:
//! - [`mapper`]: binds one entity's fields onto an insert template's
//!   positional parameters.
//! - [`insertion`]: runs one parameterized insert per entity, collecting
//!   per-entity failures instead of aborting.
//! - [`executor`]: a single-connection wrapper for update, query and batch
//!   execution with named timers.
//!
//! ```rust,ignore
//! let mut executor = open_executor(&config, Arc::new(MetricsTimers)).await?;
//! let summary = InsertionService::new(&mut executor)
//!     .insert_entities(
//!         "INSERT INTO client (name) VALUES (?) ON CONFLICT DO NOTHING",
//!         &clients,
//!         &ClientMapper,
//!     )
//!     .await?;
//! ```

pub mod config;
pub mod database;
pub mod drop_service;
pub mod errors;
pub mod executor;
pub mod insertion;
pub mod mapper;
pub mod models;
pub mod query_service;
pub mod schema_service;
pub mod template;
pub mod timers;

pub use config::DbConfig;
pub use database::{connect, open_executor};
pub use errors::{BindingError, DbError};
pub use executor::{BatchSummary, QueryOutcome, SqlExecutor, StatementRunner};
pub use insertion::{InsertFailure, InsertSummary, InsertionService};
pub use mapper::{
    ClientMapper, EntityMapper, ProjectMapper, SqlParam, StatementParams, WorkerMapper,
};
pub use models::{Client, Level, Project, Worker};
pub use timers::{MetricsTimers, TimerRegistry, TimerSink};
