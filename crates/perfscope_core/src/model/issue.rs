//! Issue record and its lifecycle transitions.
//!
//! # Responsibility
//! - Hold reported problems linked to objectives or metrics.
//! - Apply assignment and status side effects in one place.
//!
//! # Invariants
//! - New issues start `open`.
//! - Assignment forces `in_progress`.
//! - `resolved_at` is stamped on the first entry into `resolved` and never
//!   rewritten afterwards.
//! - Any status may follow any other; there is no transition table.

use crate::model::actor::ActorId;
use crate::model::metric::MetricId;
use crate::model::now_epoch_ms;
use crate::model::objective::ObjectiveId;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable issue identifier.
pub type IssueId = Uuid;

/// Issue status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueStatus {
    Open,
    InProgress,
    Resolved,
    Closed,
}

impl IssueStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Resolved => "resolved",
            Self::Closed => "closed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "open" => Some(Self::Open),
            "in_progress" => Some(Self::InProgress),
            "resolved" => Some(Self::Resolved),
            "closed" => Some(Self::Closed),
            _ => None,
        }
    }
}

/// Issue priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssuePriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl IssuePriority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            "urgent" => Some(Self::Urgent),
            _ => None,
        }
    }
}

/// Reported problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub id: IssueId,
    pub title: String,
    pub description: String,
    pub status: IssueStatus,
    pub priority: IssuePriority,
    pub solution: Option<String>,
    pub created_by: ActorId,
    pub assignee_id: Option<ActorId>,
    pub objective_id: Option<ObjectiveId>,
    pub metric_id: Option<MetricId>,
    /// Epoch milliseconds of the first transition into `resolved`.
    pub resolved_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Issue {
    /// Creates an `open` issue reported by `created_by`.
    pub fn new(title: impl Into<String>, created_by: ActorId) -> Self {
        let now = now_epoch_ms();
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            description: String::new(),
            status: IssueStatus::Open,
            priority: IssuePriority::Medium,
            solution: None,
            created_by,
            assignee_id: None,
            objective_id: None,
            metric_id: None,
            resolved_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Assigns the issue and moves it to `in_progress`.
    ///
    /// Returns `false` when the issue was already in progress with the same
    /// assignee, in which case nothing changes.
    pub fn assign_to(&mut self, assignee_id: ActorId) -> bool {
        if self.assignee_id == Some(assignee_id) && self.status == IssueStatus::InProgress {
            return false;
        }
        self.assignee_id = Some(assignee_id);
        self.status = IssueStatus::InProgress;
        true
    }

    /// Overwrites status with no transition checks.
    ///
    /// Entering `resolved` stamps `resolved_at` only when it is still unset.
    pub fn transition_to(&mut self, status: IssueStatus, now_ms: i64) {
        if status == IssueStatus::Resolved && self.resolved_at.is_none() {
            self.resolved_at = Some(now_ms);
        }
        self.status = status;
    }

    /// Whether `actor_id` reported or is assigned to this issue.
    pub fn involves(&self, actor_id: ActorId) -> bool {
        self.created_by == actor_id || self.assignee_id == Some(actor_id)
    }

    pub fn validate(&self) -> Result<(), IssueValidationError> {
        if self.title.trim().is_empty() {
            return Err(IssueValidationError::BlankTitle);
        }
        if self.status == IssueStatus::Resolved && self.resolved_at.is_none() {
            return Err(IssueValidationError::MissingResolutionTime(self.id));
        }
        Ok(())
    }
}

/// Issue validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueValidationError {
    BlankTitle,
    MissingResolutionTime(IssueId),
}

impl Display for IssueValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankTitle => write!(f, "issue title must not be blank"),
            Self::MissingResolutionTime(id) => {
                write!(f, "resolved issue has no resolution time: {id}")
            }
        }
    }
}

impl Error for IssueValidationError {}

#[cfg(test)]
mod tests {
    use super::{Issue, IssueStatus};
    use uuid::Uuid;

    #[test]
    fn new_issue_starts_open_and_unassigned() {
        let issue = Issue::new("Scanner offline", Uuid::new_v4());
        assert_eq!(issue.status, IssueStatus::Open);
        assert!(issue.assignee_id.is_none());
        assert!(issue.resolved_at.is_none());
    }

    #[test]
    fn assignment_forces_in_progress_from_any_status() {
        for prior in [
            IssueStatus::Open,
            IssueStatus::Resolved,
            IssueStatus::Closed,
        ] {
            let mut issue = Issue::new("t", Uuid::new_v4());
            issue.status = prior;
            let assignee = Uuid::new_v4();
            assert!(issue.assign_to(assignee));
            assert_eq!(issue.assignee_id, Some(assignee));
            assert_eq!(issue.status, IssueStatus::InProgress);
        }
    }

    #[test]
    fn reassigning_same_actor_in_progress_is_a_no_op() {
        let mut issue = Issue::new("t", Uuid::new_v4());
        let assignee = Uuid::new_v4();
        assert!(issue.assign_to(assignee));
        assert!(!issue.assign_to(assignee));
        assert!(issue.assign_to(Uuid::new_v4()));
    }

    #[test]
    fn resolution_time_is_stamped_once() {
        let mut issue = Issue::new("t", Uuid::new_v4());
        issue.transition_to(IssueStatus::Resolved, 1_000);
        assert_eq!(issue.resolved_at, Some(1_000));

        issue.transition_to(IssueStatus::InProgress, 2_000);
        issue.transition_to(IssueStatus::Resolved, 3_000);
        assert_eq!(issue.resolved_at, Some(1_000));
        assert_eq!(issue.status, IssueStatus::Resolved);
    }

    #[test]
    fn open_to_closed_is_permitted() {
        let mut issue = Issue::new("t", Uuid::new_v4());
        issue.transition_to(IssueStatus::Closed, 1);
        assert_eq!(issue.status, IssueStatus::Closed);
        assert!(issue.resolved_at.is_none());
    }
}
