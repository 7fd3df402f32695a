//! Generic entity insertion.
//!
//! [`InsertionService::insert_entities`] binds each entity of a homogeneous
//! sequence onto one insert template and executes it as its own unit of
//! work. A failing entity is recorded and logged; the rest of the sequence
//! still runs and earlier inserts are kept.

use tracing::{error, info};

use crate::errors::{BindingError, DbError};
use crate::executor::StatementRunner;
use crate::mapper::{EntityMapper, StatementParams};
use crate::template::SqlTemplate;

/// One entity that could not be inserted.
#[derive(Debug)]
pub struct InsertFailure {
    /// Position of the entity in the input sequence.
    pub index: usize,
    pub error: DbError,
}

/// Outcome of one insertion pass.
#[derive(Debug, Default)]
pub struct InsertSummary {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub failures: Vec<InsertFailure>,
}

impl InsertSummary {
    pub fn is_complete(&self) -> bool {
        self.failed == 0
    }

    fn record_success(&mut self) {
        self.attempted += 1;
        self.succeeded += 1;
    }

    fn record_failure(&mut self, index: usize, error: DbError) {
        self.attempted += 1;
        self.failed += 1;
        self.failures.push(InsertFailure { index, error });
    }
}

/// Table named after `INTO` in an insert template, for log context.
pub fn target_table(template: &str) -> &str {
    let mut tokens = template.split_whitespace();
    while let Some(token) = tokens.next() {
        if token.eq_ignore_ascii_case("into") {
            return tokens
                .next()
                .map(|t| t.split('(').next().unwrap_or(t))
                .unwrap_or("?");
        }
    }
    "?"
}

/// Inserts entity sequences through a shared statement runner.
pub struct InsertionService<'r, R: StatementRunner> {
    runner: &'r mut R,
}

impl<'r, R: StatementRunner> InsertionService<'r, R> {
    pub fn new(runner: &'r mut R) -> Self {
        Self { runner }
    }

    /// Inserts `entities` in order, one statement per entity.
    ///
    /// Only an unusable template, or one whose placeholder count differs from
    /// the mapper's arity, is an error; per-entity binding and execution
    /// failures are collected in the returned summary.
    pub async fn insert_entities<E, M>(
        &mut self,
        template: &str,
        entities: &[E],
        mapper: &M,
    ) -> Result<InsertSummary, DbError>
    where
        E: Sync,
        M: EntityMapper<E> + ?Sized,
    {
        let table = target_table(template);
        let template = SqlTemplate::parse(template).map_err(|e| {
            error!("Unusable insert template for {table}: {e}");
            DbError::from(e)
        })?;

        if mapper.arity() != template.placeholders() {
            let e = BindingError::PlaceholderMismatch {
                expected: template.placeholders(),
                actual: mapper.arity(),
            };
            error!("Insert template for {table} does not fit its mapper: {e}");
            return Err(e.into());
        }

        let mut summary = InsertSummary::default();
        if entities.is_empty() {
            return Ok(summary);
        }

        info!("Inserting {} rows into {table}...", entities.len());

        for (index, entity) in entities.iter().enumerate() {
            match self.insert_one(&template, entity, mapper).await {
                Ok(_) => summary.record_success(),
                Err(e) => {
                    if e.is_binding() {
                        error!("Failed to bind {table} entity #{index}: {e}");
                    } else {
                        error!("Failed to insert {table} entity #{index}: {e}");
                    }
                    summary.record_failure(index, e);
                }
            }
        }

        info!(
            "Inserted into {table}: {} attempted, {} succeeded, {} failed",
            summary.attempted, summary.succeeded, summary.failed
        );
        Ok(summary)
    }

    async fn insert_one<E, M>(
        &mut self,
        template: &SqlTemplate,
        entity: &E,
        mapper: &M,
    ) -> Result<u64, DbError>
    where
        M: EntityMapper<E> + ?Sized,
    {
        let mut params = StatementParams::with_capacity(template.placeholders());
        mapper.map_to_statement(&mut params, entity)?;

        if params.len() != template.placeholders() {
            return Err(BindingError::PlaceholderMismatch {
                expected: template.placeholders(),
                actual: params.len(),
            }
            .into());
        }

        self.runner.run_bound(template.sql(), &params).await
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use time::{Month, macros::date};

    use super::*;
    use crate::mapper::{ClientMapper, SqlParam, WorkerMapper};
    use crate::models::{Client, Level, Worker};

    const WORKER_TEMPLATE: &str = "INSERT INTO worker (name, birthday, email, level, salary) \
        VALUES (?, ?, ?, ?, ?) ON CONFLICT DO NOTHING";
    const CLIENT_TEMPLATE: &str = "INSERT INTO client (name) VALUES (?) ON CONFLICT DO NOTHING";

    /// Records every executed statement; fails the calls listed in `fail_on`.
    #[derive(Default)]
    struct RecordingRunner {
        executed: Vec<(String, Vec<SqlParam>)>,
        fail_on: Vec<usize>,
        calls: usize,
    }

    #[async_trait]
    impl StatementRunner for RecordingRunner {
        async fn run_bound(&mut self, sql: &str, params: &StatementParams) -> Result<u64, DbError> {
            let call = self.calls;
            self.calls += 1;
            if self.fail_on.contains(&call) {
                return Err(DbError::statement("insert", sqlx::Error::RowNotFound));
            }
            self.executed.push((sql.to_string(), params.values().to_vec()));
            Ok(1)
        }
    }

    fn clients(names: &[&str]) -> Vec<Client> {
        names.iter().map(|n| Client::new(*n)).collect()
    }

    #[tokio::test]
    async fn test_executes_one_statement_per_entity_in_order() {
        let mut runner = RecordingRunner::default();
        let entities = clients(&["Purrfect Solutions", "Meowster Inc.", "Snack Caterprises"]);

        let summary = InsertionService::new(&mut runner)
            .insert_entities(CLIENT_TEMPLATE, &entities, &ClientMapper)
            .await
            .unwrap();

        assert_eq!(summary.attempted, 3);
        assert_eq!(summary.succeeded, 3);
        assert!(summary.is_complete());

        let names: Vec<_> = runner
            .executed
            .iter()
            .map(|(_, params)| params[0].clone())
            .collect();
        assert_eq!(
            names,
            vec![
                SqlParam::Text("Purrfect Solutions".into()),
                SqlParam::Text("Meowster Inc.".into()),
                SqlParam::Text("Snack Caterprises".into()),
            ]
        );
        let expected = "INSERT INTO client (name) VALUES ($1) ON CONFLICT DO NOTHING";
        assert!(runner.executed.iter().all(|(sql, _)| sql == expected));
    }

    #[tokio::test]
    async fn test_empty_sequence_is_noop() {
        let mut runner = RecordingRunner::default();
        let summary = InsertionService::new(&mut runner)
            .insert_entities(CLIENT_TEMPLATE, &Vec::<Client>::new(), &ClientMapper)
            .await
            .unwrap();

        assert_eq!(summary.attempted, 0);
        assert_eq!(runner.calls, 0);
    }

    #[tokio::test]
    async fn test_execution_failure_does_not_stop_the_pass() {
        let mut runner = RecordingRunner {
            fail_on: vec![1],
            ..Default::default()
        };
        let entities = clients(&["A Co.", "B Co.", "C Co."]);

        let summary = InsertionService::new(&mut runner)
            .insert_entities(CLIENT_TEMPLATE, &entities, &ClientMapper)
            .await
            .unwrap();

        assert_eq!(summary.attempted, 3);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.failures[0].index, 1);
        assert!(matches!(summary.failures[0].error, DbError::Statement { .. }));
        assert_eq!(runner.executed.len(), 2);
    }

    #[tokio::test]
    async fn test_binding_failure_skips_only_that_entity() {
        let mut runner = RecordingRunner::default();
        let workers = vec![
            Worker::new("Bob", date!(1995 - 10 - 11), "bob@example.com", Level::Middle, 20000),
            Worker::new(
                "Caesar",
                time::Date::from_calendar_date(-44, Month::March, 15).unwrap(),
                "caesar@example.com",
                Level::Senior,
                50000,
            ),
            Worker::new("Eve", date!(2000 - 01 - 01), "eve@example.com", Level::Senior, 32000),
        ];

        let summary = InsertionService::new(&mut runner)
            .insert_entities(WORKER_TEMPLATE, &workers, &WorkerMapper)
            .await
            .unwrap();

        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 1);
        assert!(matches!(
            summary.failures[0].error,
            DbError::Binding(BindingError::MalformedDate { field: "birthday", .. })
        ));
        assert_eq!(runner.calls, 2);
    }

    #[tokio::test]
    async fn test_template_not_matching_mapper_arity_fails_fast() {
        let mut runner = RecordingRunner::default();
        let result = InsertionService::new(&mut runner)
            .insert_entities(
                "INSERT INTO client (name, note) VALUES (?, ?)",
                &clients(&["Solo Co.", "Duo Co."]),
                &ClientMapper,
            )
            .await;

        assert!(matches!(
            result,
            Err(DbError::Binding(BindingError::PlaceholderMismatch {
                expected: 2,
                actual: 1
            }))
        ));
        assert_eq!(runner.calls, 0);
    }

    /// Declares one value but binds two.
    struct OverbindingMapper;

    impl EntityMapper<Client> for OverbindingMapper {
        fn map_to_statement(
            &self,
            params: &mut StatementParams,
            client: &Client,
        ) -> Result<(), BindingError> {
            params.push_text(&client.name).push_text("extra");
            Ok(())
        }

        fn arity(&self) -> usize {
            1
        }
    }

    #[tokio::test]
    async fn test_mapper_binding_more_than_its_arity_fails_that_entity() {
        let mut runner = RecordingRunner::default();
        let summary = InsertionService::new(&mut runner)
            .insert_entities(CLIENT_TEMPLATE, &clients(&["Solo Co."]), &OverbindingMapper)
            .await
            .unwrap();

        assert_eq!(summary.failed, 1);
        assert!(matches!(
            summary.failures[0].error,
            DbError::Binding(BindingError::PlaceholderMismatch {
                expected: 1,
                actual: 2
            })
        ));
        assert_eq!(runner.calls, 0);
    }

    #[tokio::test]
    async fn test_empty_template_is_fatal() {
        let mut runner = RecordingRunner::default();
        let result = InsertionService::new(&mut runner)
            .insert_entities(" ", &clients(&["X"]), &ClientMapper)
            .await;

        assert!(matches!(
            result,
            Err(DbError::Binding(BindingError::EmptyTemplate))
        ));
    }

    #[test]
    fn test_target_table() {
        assert_eq!(target_table(WORKER_TEMPLATE), "worker");
        assert_eq!(target_table("insert into client(name) values (?)"), "client");
        assert_eq!(target_table("SELECT 1"), "?");
    }
}
