//! Entity-to-parameter mapping.
//!
//! An [`EntityMapper`] binds one entity's fields, in declaration order, onto
//! the positional parameters of an insert template. The order is a
//! convention shared with the template text; [`crate::insertion`] checks the
//! count but not the meaning.

use sqlx::{Postgres, postgres::PgArguments, query::Query};
use time::{Date, macros::format_description};

use crate::errors::BindingError;
use crate::models::{Client, Project, Worker};

/// A single positional parameter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlParam {
    Text(String),
    Int(i32),
    Date(Date),
}

impl SqlParam {
    /// Binds this value onto a prepared query.
    pub fn bind_to<'q>(
        &'q self,
        query: Query<'q, Postgres, PgArguments>,
    ) -> Query<'q, Postgres, PgArguments> {
        match self {
            SqlParam::Text(v) => query.bind(v.as_str()),
            SqlParam::Int(v) => query.bind(*v),
            SqlParam::Date(v) => query.bind(*v),
        }
    }
}

/// Parameters bound for one statement execution, in placeholder order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatementParams {
    values: Vec<SqlParam>,
}

impl StatementParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(n: usize) -> Self {
        Self {
            values: Vec::with_capacity(n),
        }
    }

    pub fn push_text(&mut self, value: impl Into<String>) -> &mut Self {
        self.values.push(SqlParam::Text(value.into()));
        self
    }

    pub fn push_int(&mut self, value: i32) -> &mut Self {
        self.values.push(SqlParam::Int(value));
        self
    }

    /// Binds a date after checking it has a canonical `yyyy-MM-dd` form.
    pub fn push_date(
        &mut self,
        field: &'static str,
        value: Date,
    ) -> Result<&mut Self, BindingError> {
        canonical_date(field, value)?;
        self.values.push(SqlParam::Date(value));
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[SqlParam] {
        &self.values
    }
}

/// Formats a date as `yyyy-MM-dd`, rejecting dates with no such form.
pub fn canonical_date(field: &'static str, date: Date) -> Result<String, BindingError> {
    if date.year() < 1 {
        return Err(BindingError::MalformedDate {
            field,
            date: date.to_string(),
        });
    }
    date.format(format_description!("[year]-[month]-[day]"))
        .map_err(|e| BindingError::MalformedDate {
            field,
            date: format!("{date} ({e})"),
        })
}

/// Binds one entity onto one parameterized statement.
pub trait EntityMapper<E> {
    /// Pushes the entity's values in the template's placeholder order.
    fn map_to_statement(&self, params: &mut StatementParams, entity: &E)
    -> Result<(), BindingError>;

    /// Number of values this mapper binds; checked against the template's
    /// placeholder count before any entity is mapped.
    fn arity(&self) -> usize;
}

/// `(name, birthday, email, level, salary)`
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkerMapper;

impl EntityMapper<Worker> for WorkerMapper {
    fn map_to_statement(
        &self,
        params: &mut StatementParams,
        worker: &Worker,
    ) -> Result<(), BindingError> {
        if worker.salary < 0 {
            return Err(BindingError::InvalidValue {
                field: "salary",
                reason: format!("negative salary {}", worker.salary),
            });
        }
        params.push_text(&worker.name);
        params.push_date("birthday", worker.birthday)?;
        params
            .push_text(&worker.email)
            .push_text(worker.level.as_str())
            .push_int(worker.salary);
        Ok(())
    }

    fn arity(&self) -> usize {
        5
    }
}

/// `(name)`
#[derive(Debug, Clone, Copy, Default)]
pub struct ClientMapper;

impl EntityMapper<Client> for ClientMapper {
    fn map_to_statement(
        &self,
        params: &mut StatementParams,
        client: &Client,
    ) -> Result<(), BindingError> {
        params.push_text(&client.name);
        Ok(())
    }

    fn arity(&self) -> usize {
        1
    }
}

/// `(name, client_id, start_date, finish_date)`
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectMapper;

impl EntityMapper<Project> for ProjectMapper {
    fn map_to_statement(
        &self,
        params: &mut StatementParams,
        project: &Project,
    ) -> Result<(), BindingError> {
        if project.finish_date < project.start_date {
            return Err(BindingError::InvalidValue {
                field: "finish_date",
                reason: format!(
                    "{} precedes start date {}",
                    project.finish_date, project.start_date
                ),
            });
        }
        params.push_text(&project.name).push_int(project.client_id);
        params.push_date("start_date", project.start_date)?;
        params.push_date("finish_date", project.finish_date)?;
        Ok(())
    }

    fn arity(&self) -> usize {
        4
    }
}

#[cfg(test)]
mod tests {
    use time::{Month, macros::date};

    use super::*;
    use crate::models::Level;

    fn alice() -> Worker {
        Worker::new(
            "Alice",
            date!(2001 - 08 - 20),
            "alice@example.com",
            Level::Senior,
            100000,
        )
    }

    #[test]
    fn test_worker_binds_fields_in_declaration_order() {
        let mut params = StatementParams::new();
        WorkerMapper.map_to_statement(&mut params, &alice()).unwrap();

        assert_eq!(params.len(), WorkerMapper.arity());
        assert_eq!(
            params.values(),
            &[
                SqlParam::Text("Alice".into()),
                SqlParam::Date(date!(2001 - 08 - 20)),
                SqlParam::Text("alice@example.com".into()),
                SqlParam::Text("senior".into()),
                SqlParam::Int(100000),
            ]
        );
    }

    #[test]
    fn test_mapping_is_deterministic() {
        let worker = alice();
        let mut first = StatementParams::new();
        let mut second = StatementParams::new();
        WorkerMapper.map_to_statement(&mut first, &worker).unwrap();
        WorkerMapper.map_to_statement(&mut second, &worker).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_client_binds_name() {
        let mut params = StatementParams::new();
        ClientMapper
            .map_to_statement(&mut params, &Client::new("Meowster Inc."))
            .unwrap();
        assert_eq!(params.values(), &[SqlParam::Text("Meowster Inc.".into())]);
        assert_eq!(params.len(), ClientMapper.arity());
    }

    #[test]
    fn test_project_binds_fields_in_declaration_order() {
        let project = Project::new(
            "Feline Fine Art",
            3,
            date!(2023 - 06 - 01),
            date!(2023 - 08 - 31),
        );
        let mut params = StatementParams::new();
        ProjectMapper.map_to_statement(&mut params, &project).unwrap();
        assert_eq!(
            params.values(),
            &[
                SqlParam::Text("Feline Fine Art".into()),
                SqlParam::Int(3),
                SqlParam::Date(date!(2023 - 06 - 01)),
                SqlParam::Date(date!(2023 - 08 - 31)),
            ]
        );
    }

    #[test]
    fn test_project_finishing_before_start_rejected() {
        let project = Project::new("Backwards", 1, date!(2023 - 06 - 01), date!(2023 - 01 - 01));
        let err = ProjectMapper
            .map_to_statement(&mut StatementParams::new(), &project)
            .unwrap_err();
        assert!(matches!(err, BindingError::InvalidValue { field: "finish_date", .. }));
    }

    #[test]
    fn test_negative_salary_rejected() {
        let mut worker = alice();
        worker.salary = -1;
        let err = WorkerMapper
            .map_to_statement(&mut StatementParams::new(), &worker)
            .unwrap_err();
        assert!(matches!(err, BindingError::InvalidValue { field: "salary", .. }));
    }

    #[test]
    fn test_malformed_birthday_rejected() {
        let mut worker = alice();
        worker.birthday = Date::from_calendar_date(-44, Month::March, 15).unwrap();
        let err = WorkerMapper
            .map_to_statement(&mut StatementParams::new(), &worker)
            .unwrap_err();
        assert!(matches!(err, BindingError::MalformedDate { field: "birthday", .. }));
    }

    #[test]
    fn test_canonical_date_format() {
        assert_eq!(
            canonical_date("d", date!(1901 - 01 - 01)).unwrap(),
            "1901-01-01"
        );
    }
}
