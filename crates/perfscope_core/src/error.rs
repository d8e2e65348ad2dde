//! Caller-facing error taxonomy of the service layer.
//!
//! Upstream insights failures are absent on purpose: the gateway absorbs
//! them into fallback payloads.

use crate::access::upload_guard::UploadDenied;
use crate::model::ValidationError;
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Actor,
    Department,
    Objective,
    Metric,
    Issue,
    Attachment,
}

impl ResourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Actor => "actor",
            Self::Department => "department",
            Self::Objective => "objective",
            Self::Metric => "metric",
            Self::Issue => "issue",
            Self::Attachment => "attachment",
        }
    }

    fn from_table(table: &str) -> Option<Self> {
        match table {
            "actors" => Some(Self::Actor),
            "departments" => Some(Self::Department),
            "objectives" => Some(Self::Objective),
            "metrics" => Some(Self::Metric),
            "issues" => Some(Self::Issue),
            "attachments" => Some(Self::Attachment),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Forbidden,
    Validation,
    Internal,
}

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug)]
pub enum ServiceError {
    NotFound { kind: ResourceKind, id: Uuid },
    Forbidden(String),
    Validation(String),
    Repo(RepoError),
}

impl ServiceError {
    pub fn not_found(kind: ResourceKind, id: Uuid) -> Self {
        Self::NotFound { kind, id }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Forbidden(_) => ErrorKind::Forbidden,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Repo(_) => ErrorKind::Internal,
        }
    }

    /// HTTP-style status class for this error.
    pub fn status_class(&self) -> u16 {
        match self.kind() {
            ErrorKind::NotFound => 404,
            ErrorKind::Forbidden => 403,
            ErrorKind::Validation => 400,
            ErrorKind::Internal => 500,
        }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { kind, id } => write!(f, "{} not found: {id}", kind.as_str()),
            Self::Forbidden(message) => write!(f, "forbidden: {message}"),
            Self::Validation(message) => write!(f, "invalid input: {message}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err.to_string()),
            RepoError::NotFound { table, id } => match ResourceKind::from_table(table) {
                Some(kind) => Self::NotFound { kind, id },
                None => Self::Repo(RepoError::NotFound { table, id }),
            },
            other => Self::Repo(other),
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value.to_string())
    }
}

impl From<UploadDenied> for ServiceError {
    fn from(value: UploadDenied) -> Self {
        Self::Forbidden(value.to_string())
    }
}
