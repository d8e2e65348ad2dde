//! Objective ("goal") record.
//!
//! # Responsibility
//! - Define the tracked target whose progress and status feed statistics.
//! - Validate progress range, date order and parent linkage shape.
//!
//! # Invariants
//! - `progress` is within `[0, 100]` for every persisted objective.
//! - `end_date >= start_date`.
//! - `parent_id` never equals `id`. Deeper cycles are rejected by
//!   `ObjectiveService::set_parent`.

use crate::model::actor::{ActorId, DepartmentId};
use crate::model::now_epoch_ms;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable objective identifier.
pub type ObjectiveId = Uuid;

/// Lower bound for objective progress.
pub const PROGRESS_MIN: f64 = 0.0;
/// Upper bound for objective progress.
pub const PROGRESS_MAX: f64 = 100.0;

/// Objective lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectiveStatus {
    NotStarted,
    InProgress,
    Completed,
    Delayed,
}

impl ObjectiveStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Delayed => "delayed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "not_started" => Some(Self::NotStarted),
            "in_progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            "delayed" => Some(Self::Delayed),
            _ => None,
        }
    }
}

/// Objective priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectivePriority {
    Low,
    Medium,
    High,
    Critical,
}

impl ObjectivePriority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            "critical" => Some(Self::Critical),
            _ => None,
        }
    }
}

/// SMART classification of an objective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectiveKind {
    Specific,
    Measurable,
    Achievable,
    Relevant,
    Timebound,
}

impl ObjectiveKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Specific => "specific",
            Self::Measurable => "measurable",
            Self::Achievable => "achievable",
            Self::Relevant => "relevant",
            Self::Timebound => "timebound",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "specific" => Some(Self::Specific),
            "measurable" => Some(Self::Measurable),
            "achievable" => Some(Self::Achievable),
            "relevant" => Some(Self::Relevant),
            "timebound" => Some(Self::Timebound),
            _ => None,
        }
    }
}

/// Tracked target owned by one assignee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Objective {
    pub id: ObjectiveId,
    pub title: String,
    pub description: String,
    pub kind: ObjectiveKind,
    pub status: ObjectiveStatus,
    pub priority: ObjectivePriority,
    /// Percent complete, `[0, 100]`.
    pub progress: f64,
    /// Epoch milliseconds.
    pub start_date: i64,
    /// Epoch milliseconds, `>= start_date`.
    pub end_date: i64,
    pub department_id: Option<DepartmentId>,
    pub assignee_id: ActorId,
    /// Parent objective id. Stored as an id, never traversed recursively
    /// outside cycle checks.
    pub parent_id: Option<ObjectiveId>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Objective {
    /// Creates a not-started objective with zero progress.
    pub fn new(
        title: impl Into<String>,
        assignee_id: ActorId,
        start_date: i64,
        end_date: i64,
    ) -> Self {
        let now = now_epoch_ms();
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            description: String::new(),
            kind: ObjectiveKind::Specific,
            status: ObjectiveStatus::NotStarted,
            priority: ObjectivePriority::Medium,
            progress: 0.0,
            start_date,
            end_date,
            department_id: None,
            assignee_id,
            parent_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Validates shape invariants before persistence.
    pub fn validate(&self) -> Result<(), ObjectiveValidationError> {
        if self.title.trim().is_empty() {
            return Err(ObjectiveValidationError::BlankTitle);
        }
        validate_progress(self.progress)?;
        if self.end_date < self.start_date {
            return Err(ObjectiveValidationError::EndBeforeStart {
                start: self.start_date,
                end: self.end_date,
            });
        }
        if self.parent_id == Some(self.id) {
            return Err(ObjectiveValidationError::SelfParent(self.id));
        }
        Ok(())
    }
}

/// Checks one progress value against `[0, 100]`.
pub fn validate_progress(progress: f64) -> Result<(), ObjectiveValidationError> {
    if !progress.is_finite() || !(PROGRESS_MIN..=PROGRESS_MAX).contains(&progress) {
        return Err(ObjectiveValidationError::ProgressOutOfRange(progress));
    }
    Ok(())
}

/// Objective validation failures.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectiveValidationError {
    BlankTitle,
    ProgressOutOfRange(f64),
    EndBeforeStart { start: i64, end: i64 },
    SelfParent(ObjectiveId),
}

impl Display for ObjectiveValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankTitle => write!(f, "objective title must not be blank"),
            Self::ProgressOutOfRange(value) => {
                write!(f, "objective progress must be within [0, 100], got {value}")
            }
            Self::EndBeforeStart { start, end } => {
                write!(f, "objective end date {end} is earlier than start date {start}")
            }
            Self::SelfParent(id) => write!(f, "objective cannot be its own parent: {id}"),
        }
    }
}

impl Error for ObjectiveValidationError {}

#[cfg(test)]
mod tests {
    use super::{Objective, ObjectiveStatus, ObjectiveValidationError};
    use uuid::Uuid;

    fn objective() -> Objective {
        Objective::new("Ship portal", Uuid::new_v4(), 1_000, 2_000)
    }

    #[test]
    fn new_objective_is_valid_and_not_started() {
        let objective = objective();
        assert_eq!(objective.status, ObjectiveStatus::NotStarted);
        assert_eq!(objective.progress, 0.0);
        objective.validate().expect("fresh objective is valid");
    }

    #[test]
    fn rejects_progress_outside_percent_range() {
        let mut objective = objective();
        objective.progress = 100.5;
        assert_eq!(
            objective.validate(),
            Err(ObjectiveValidationError::ProgressOutOfRange(100.5))
        );
        objective.progress = -1.0;
        assert!(objective.validate().is_err());
        objective.progress = f64::NAN;
        assert!(objective.validate().is_err());
        objective.progress = 100.0;
        objective.validate().expect("upper bound is inclusive");
    }

    #[test]
    fn rejects_end_before_start_and_self_parent() {
        let mut objective = objective();
        objective.end_date = 500;
        assert!(matches!(
            objective.validate(),
            Err(ObjectiveValidationError::EndBeforeStart { .. })
        ));

        let mut objective = super::Objective::new("x", Uuid::new_v4(), 0, 0);
        objective.parent_id = Some(objective.id);
        assert_eq!(
            objective.validate(),
            Err(ObjectiveValidationError::SelfParent(objective.id))
        );
    }

    #[test]
    fn status_labels_round_trip_through_parse() {
        for status in [
            ObjectiveStatus::NotStarted,
            ObjectiveStatus::InProgress,
            ObjectiveStatus::Completed,
            ObjectiveStatus::Delayed,
        ] {
            assert_eq!(ObjectiveStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ObjectiveStatus::parse("done"), None);
    }
}
