//! Domain records for performance tracking.
//!
//! # Responsibility
//! - Define the typed records read and mutated by core services.
//! - Keep validation next to the record it guards.
//!
//! # Invariants
//! - Every record is identified by a stable UUID.
//! - Progress values stay inside `[0, 100]`.
//! - Role labels are parsed once into [`role::Role`]; nothing downstream
//!   compares raw label strings.

pub mod actor;
pub mod attachment;
pub mod issue;
pub mod metric;
pub mod objective;
pub mod role;

use crate::model::attachment::AttachmentValidationError;
use crate::model::issue::IssueValidationError;
use crate::model::metric::MetricValidationError;
use crate::model::objective::ObjectiveValidationError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};

/// Current wall clock in epoch milliseconds.
pub(crate) fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or_default()
}

/// Validation failure from any record kind.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    Objective(ObjectiveValidationError),
    Metric(MetricValidationError),
    Issue(IssueValidationError),
    Attachment(AttachmentValidationError),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Objective(err) => write!(f, "{err}"),
            Self::Metric(err) => write!(f, "{err}"),
            Self::Issue(err) => write!(f, "{err}"),
            Self::Attachment(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ValidationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Objective(err) => Some(err),
            Self::Metric(err) => Some(err),
            Self::Issue(err) => Some(err),
            Self::Attachment(err) => Some(err),
        }
    }
}

impl From<ObjectiveValidationError> for ValidationError {
    fn from(value: ObjectiveValidationError) -> Self {
        Self::Objective(value)
    }
}

impl From<MetricValidationError> for ValidationError {
    fn from(value: MetricValidationError) -> Self {
        Self::Metric(value)
    }
}

impl From<IssueValidationError> for ValidationError {
    fn from(value: IssueValidationError) -> Self {
        Self::Issue(value)
    }
}

impl From<AttachmentValidationError> for ValidationError {
    fn from(value: AttachmentValidationError) -> Self {
        Self::Attachment(value)
    }
}
