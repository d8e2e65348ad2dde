//! Visibility resolver.
//!
//! Converts an actor and an optional requested target into a [`Scope`], then
//! projects that scope onto repository filters and record predicates so that
//! every resource kind applies the same rule.

use crate::insights::payload::InsightsQuery;
use crate::model::actor::{Actor, ActorId, DepartmentId};
use crate::model::issue::Issue;
use crate::model::metric::Metric;
use crate::model::objective::Objective;
use crate::repo::issue_repo::IssueFilter;
use crate::repo::metric_repo::MetricFilter;
use crate::repo::objective_repo::ObjectiveFilter;
use log::debug;
use serde::Serialize;

/// Effective set of records an actor may read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Scope {
    /// The requesting actor's own records.
    Own(ActorId),
    /// Another actor's records, reachable only by manager-class actors.
    User(ActorId),
    Department(DepartmentId),
    All,
}

/// Request parameters that may narrow a manager-class actor's scope.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScopeRequest {
    pub target: Option<ActorId>,
    /// Prefer the actor's department over `All` when no target is given.
    pub department_wide: bool,
}

impl ScopeRequest {
    pub fn for_target(target: Option<ActorId>) -> Self {
        Self {
            target,
            department_wide: false,
        }
    }

    pub fn department_wide() -> Self {
        Self {
            target: None,
            department_wide: true,
        }
    }
}

/// Resolves the effective scope for `actor`.
///
/// Non-manager actors always get [`Scope::Own`]; any requested target is
/// ignored.
pub fn resolve_scope(actor: &Actor, request: &ScopeRequest) -> Scope {
    if !actor.can_act_as_manager() {
        if request.target.is_some_and(|target| target != actor.id) {
            debug!(
                "event=scope_resolve module=access status=ok actor_id={} target_ignored=true",
                actor.id
            );
        }
        return Scope::Own(actor.id);
    }

    match (request.target, request.department_wide, actor.department_id) {
        (Some(target), _, _) => Scope::User(target),
        (None, true, Some(department_id)) => Scope::Department(department_id),
        _ => Scope::All,
    }
}

impl Scope {
    /// Single actor this scope is pinned to, if any.
    pub fn subject(&self) -> Option<ActorId> {
        match self {
            Self::Own(id) | Self::User(id) => Some(*id),
            Self::Department(_) | Self::All => None,
        }
    }

    pub fn admits_objective(&self, objective: &Objective) -> bool {
        match self {
            Self::Own(id) | Self::User(id) => objective.assignee_id == *id,
            Self::Department(department_id) => objective.department_id == Some(*department_id),
            Self::All => true,
        }
    }

    /// `owner_id` is the assignee of the metric's linked objective.
    pub fn admits_metric(&self, metric: &Metric, owner_id: Option<ActorId>) -> bool {
        match self {
            Self::Own(id) | Self::User(id) => owner_id == Some(*id),
            Self::Department(department_id) => metric.department_id == Some(*department_id),
            Self::All => true,
        }
    }

    /// `creator_department` is the department of the issue's reporter.
    pub fn admits_issue(&self, issue: &Issue, creator_department: Option<DepartmentId>) -> bool {
        match self {
            Self::Own(id) | Self::User(id) => issue.involves(*id),
            Self::Department(department_id) => creator_department == Some(*department_id),
            Self::All => true,
        }
    }

    pub fn objective_filter(&self) -> ObjectiveFilter {
        match self {
            Self::Own(id) | Self::User(id) => ObjectiveFilter {
                assignee_id: Some(*id),
                ..ObjectiveFilter::default()
            },
            Self::Department(department_id) => ObjectiveFilter {
                department_id: Some(*department_id),
                ..ObjectiveFilter::default()
            },
            Self::All => ObjectiveFilter::default(),
        }
    }

    pub fn metric_filter(&self) -> MetricFilter {
        match self {
            Self::Own(id) | Self::User(id) => MetricFilter {
                owner_id: Some(*id),
                ..MetricFilter::default()
            },
            Self::Department(department_id) => MetricFilter {
                department_id: Some(*department_id),
                ..MetricFilter::default()
            },
            Self::All => MetricFilter::default(),
        }
    }

    pub fn issue_filter(&self) -> IssueFilter {
        match self {
            Self::Own(id) | Self::User(id) => IssueFilter {
                involving: Some(*id),
                ..IssueFilter::default()
            },
            Self::Department(department_id) => IssueFilter {
                department_id: Some(*department_id),
                ..IssueFilter::default()
            },
            Self::All => IssueFilter::default(),
        }
    }

    /// Query parameters for the external insights service.
    pub fn insights_query(&self) -> InsightsQuery {
        match self {
            Self::Own(id) | Self::User(id) => InsightsQuery {
                user_id: Some(*id),
                department_id: None,
            },
            Self::Department(department_id) => InsightsQuery {
                user_id: None,
                department_id: Some(*department_id),
            },
            Self::All => InsightsQuery::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{resolve_scope, Scope, ScopeRequest};
    use crate::model::actor::Actor;
    use crate::model::issue::Issue;
    use crate::model::objective::Objective;
    use crate::model::role::Role;
    use uuid::Uuid;

    fn actor(role: Role) -> Actor {
        Actor::new("A", format!("{}@example.org", Uuid::new_v4()), role)
            .in_department(Uuid::new_v4())
    }

    #[test]
    fn non_manager_target_is_ignored() {
        let employee = actor(Role::Employee);
        let other = Uuid::new_v4();
        assert_eq!(
            resolve_scope(&employee, &ScopeRequest::for_target(Some(other))),
            Scope::Own(employee.id)
        );
        assert_eq!(
            resolve_scope(&employee, &ScopeRequest::department_wide()),
            Scope::Own(employee.id)
        );
    }

    #[test]
    fn manager_target_selects_user_scope() {
        let manager = actor(Role::DepartmentHead);
        let target = Uuid::new_v4();
        assert_eq!(
            resolve_scope(&manager, &ScopeRequest::for_target(Some(target))),
            Scope::User(target)
        );
    }

    #[test]
    fn manager_without_target_sees_all_or_department() {
        let manager = actor(Role::Manager);
        assert_eq!(
            resolve_scope(&manager, &ScopeRequest::default()),
            Scope::All
        );
        assert_eq!(
            resolve_scope(&manager, &ScopeRequest::department_wide()),
            Scope::Department(manager.department_id.expect("department"))
        );

        let mut detached = actor(Role::Admin);
        detached.department_id = None;
        assert_eq!(
            resolve_scope(&detached, &ScopeRequest::department_wide()),
            Scope::All
        );
    }

    #[test]
    fn predicates_follow_scope_shape() {
        let owner = Uuid::new_v4();
        let department = Uuid::new_v4();
        let mut objective = Objective::new("o", owner, 0, 1);
        objective.department_id = Some(department);

        assert!(Scope::Own(owner).admits_objective(&objective));
        assert!(!Scope::Own(Uuid::new_v4()).admits_objective(&objective));
        assert!(Scope::Department(department).admits_objective(&objective));
        assert!(Scope::All.admits_objective(&objective));

        let mut issue = Issue::new("i", Uuid::new_v4());
        issue.assignee_id = Some(owner);
        assert!(Scope::User(owner).admits_issue(&issue, None));
        assert!(!Scope::Department(department).admits_issue(&issue, None));
    }

    #[test]
    fn filters_and_insights_query_carry_subject() {
        let id = Uuid::new_v4();
        assert_eq!(Scope::Own(id).objective_filter().assignee_id, Some(id));
        assert_eq!(Scope::User(id).metric_filter().owner_id, Some(id));
        assert_eq!(Scope::Own(id).issue_filter().involving, Some(id));
        assert_eq!(Scope::User(id).insights_query().user_id, Some(id));
        assert!(Scope::All.insights_query().user_id.is_none());
        assert_eq!(
            Scope::Department(id).insights_query().department_id,
            Some(id)
        );
    }
}
