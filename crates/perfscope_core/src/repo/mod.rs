//! Record-store contracts and the SQLite reference implementation.
//!
//! # Responsibility
//! - Define use-case oriented data access traits per record kind.
//! - Isolate SQL details from services and scope logic.
//!
//! # Invariants
//! - Write paths validate records before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Updates are last-write-wins; updating a missing row is `NotFound`.

pub mod actor_repo;
pub mod attachment_repo;
pub mod issue_repo;
pub mod metric_repo;
pub mod objective_repo;

use crate::db::DbError;
use crate::repo::actor_repo::{ActorRepository, SqliteActorRepository};
use crate::repo::attachment_repo::{AttachmentRepository, SqliteAttachmentRepository};
use crate::repo::issue_repo::{IssueRepository, SqliteIssueRepository};
use crate::repo::metric_repo::{MetricRepository, SqliteMetricRepository};
use crate::repo::objective_repo::{ObjectiveRepository, SqliteObjectiveRepository};
use crate::model::attachment::AttachmentValidationError;
use crate::model::issue::IssueValidationError;
use crate::model::metric::MetricValidationError;
use crate::model::objective::ObjectiveValidationError;
use crate::model::ValidationError;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by every record kind.
#[derive(Debug)]
pub enum RepoError {
    Validation(ValidationError),
    Db(DbError),
    NotFound { table: &'static str, id: Uuid },
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { table, id } => write!(f, "{table} row not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound { .. } | Self::InvalidData(_) => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<ObjectiveValidationError> for RepoError {
    fn from(value: ObjectiveValidationError) -> Self {
        Self::Validation(value.into())
    }
}

impl From<MetricValidationError> for RepoError {
    fn from(value: MetricValidationError) -> Self {
        Self::Validation(value.into())
    }
}

impl From<IssueValidationError> for RepoError {
    fn from(value: IssueValidationError) -> Self {
        Self::Validation(value.into())
    }
}

impl From<AttachmentValidationError> for RepoError {
    fn from(value: AttachmentValidationError) -> Self {
        Self::Validation(value.into())
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

pub(crate) fn parse_uuid(value: &str, column: &'static str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}

pub(crate) fn parse_optional_uuid(
    value: Option<String>,
    column: &'static str,
) -> RepoResult<Option<Uuid>> {
    value.map(|text| parse_uuid(&text, column)).transpose()
}

pub(crate) fn parse_label<T>(
    value: &str,
    column: &'static str,
    parse: impl FnOnce(&str) -> Option<T>,
) -> RepoResult<T> {
    parse(value).ok_or_else(|| RepoError::InvalidData(format!("invalid value `{value}` in {column}")))
}

/// All record-store contracts behind one handle.
pub trait RecordStore {
    fn actors(&self) -> &dyn ActorRepository;
    fn objectives(&self) -> &dyn ObjectiveRepository;
    fn metrics(&self) -> &dyn MetricRepository;
    fn issues(&self) -> &dyn IssueRepository;
    fn attachments(&self) -> &dyn AttachmentRepository;
}

impl<T: RecordStore + ?Sized> RecordStore for &T {
    fn actors(&self) -> &dyn ActorRepository {
        (**self).actors()
    }

    fn objectives(&self) -> &dyn ObjectiveRepository {
        (**self).objectives()
    }

    fn metrics(&self) -> &dyn MetricRepository {
        (**self).metrics()
    }

    fn issues(&self) -> &dyn IssueRepository {
        (**self).issues()
    }

    fn attachments(&self) -> &dyn AttachmentRepository {
        (**self).attachments()
    }
}

/// SQLite repositories sharing one migrated connection.
pub struct SqliteStore<'conn> {
    actors: SqliteActorRepository<'conn>,
    objectives: SqliteObjectiveRepository<'conn>,
    metrics: SqliteMetricRepository<'conn>,
    issues: SqliteIssueRepository<'conn>,
    attachments: SqliteAttachmentRepository<'conn>,
}

impl<'conn> SqliteStore<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        Ok(Self {
            actors: SqliteActorRepository::try_new(conn)?,
            objectives: SqliteObjectiveRepository::try_new(conn)?,
            metrics: SqliteMetricRepository::try_new(conn)?,
            issues: SqliteIssueRepository::try_new(conn)?,
            attachments: SqliteAttachmentRepository::try_new(conn)?,
        })
    }
}

impl RecordStore for SqliteStore<'_> {
    fn actors(&self) -> &dyn ActorRepository {
        &self.actors
    }

    fn objectives(&self) -> &dyn ObjectiveRepository {
        &self.objectives
    }

    fn metrics(&self) -> &dyn MetricRepository {
        &self.metrics
    }

    fn issues(&self) -> &dyn IssueRepository {
        &self.issues
    }

    fn attachments(&self) -> &dyn AttachmentRepository {
        &self.attachments
    }
}
