//! Issue lifecycle service.
//!
//! # Invariants
//! - New issues start `open` with priority `medium` unless given.
//! - Assignment forces `in_progress` and requires a manager-class caller.
//! - Status changes are free-form; the first entry into `resolved` stamps
//!   `resolved_at` and later entries keep it.
//! - One issue is visible to its creator, its assignee and manager-class
//!   actors.

use crate::access::scope::{resolve_scope, Scope, ScopeRequest};
use crate::error::{ResourceKind, ServiceError, ServiceResult};
use crate::model::actor::{Actor, ActorId};
use crate::model::issue::{Issue, IssueId, IssuePriority, IssueStatus};
use crate::model::metric::MetricId;
use crate::model::now_epoch_ms;
use crate::model::objective::ObjectiveId;
use crate::repo::RecordStore;
use crate::service::{load_metric, load_objective, require_manager, resolve_actor};
use log::info;
use serde::Serialize;

/// Input for [`IssueService::create_issue`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewIssue {
    pub title: String,
    pub description: String,
    pub priority: Option<IssuePriority>,
    pub objective_id: Option<ObjectiveId>,
    pub metric_id: Option<MetricId>,
}

/// Partial update. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssuePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<IssuePriority>,
    pub solution: Option<String>,
    pub status: Option<IssueStatus>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IssueListQuery {
    /// Only issues the actor created or is assigned to, even for managers.
    pub mine: bool,
    pub target: Option<ActorId>,
    pub status: Option<IssueStatus>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IssueStats {
    pub total: usize,
    pub open: usize,
    pub in_progress: usize,
    pub resolved: usize,
    pub closed: usize,
}

pub struct IssueService<S: RecordStore> {
    store: S,
}

impl<S: RecordStore> IssueService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn create_issue(&self, actor: &Actor, input: NewIssue) -> ServiceResult<Issue> {
        if input.title.trim().is_empty() {
            return Err(ServiceError::validation("issue title must not be blank"));
        }
        if let Some(objective_id) = input.objective_id {
            load_objective(&self.store, objective_id)?;
        }
        if let Some(metric_id) = input.metric_id {
            load_metric(&self.store, metric_id)?;
        }

        let mut issue = Issue::new(input.title.trim(), actor.id);
        issue.description = input.description;
        issue.priority = input.priority.unwrap_or_default();
        issue.objective_id = input.objective_id;
        issue.metric_id = input.metric_id;

        self.store.issues().create_issue(&issue)?;
        info!(
            "event=issue_create module=issues status=ok actor_id={} issue_id={}",
            actor.id, issue.id
        );
        Ok(issue)
    }

    pub fn get_issue(&self, actor: &Actor, id: IssueId) -> ServiceResult<Issue> {
        let issue = self.load(id)?;
        ensure_involved(actor, &issue)?;
        Ok(issue)
    }

    pub fn list_issues(&self, actor: &Actor, query: &IssueListQuery) -> ServiceResult<Vec<Issue>> {
        let scope = if query.mine {
            Scope::Own(actor.id)
        } else {
            resolve_scope(actor, &ScopeRequest::for_target(query.target))
        };
        let mut filter = scope.issue_filter();
        filter.status = query.status;
        Ok(self.store.issues().list_issues(&filter)?)
    }

    /// Assigns `id` to `assignee_id` and moves it to `in_progress`.
    pub fn assign_issue(
        &self,
        actor: &Actor,
        id: IssueId,
        assignee_id: ActorId,
    ) -> ServiceResult<Issue> {
        let mut issue = self.load(id)?;
        resolve_actor(&self.store, assignee_id)?;
        require_manager(actor, "assign issues")?;

        if issue.assign_to(assignee_id) {
            issue.updated_at = now_epoch_ms();
            self.store.issues().update_issue(&issue)?;
            info!(
                "event=issue_assign module=issues status=ok actor_id={} issue_id={} assignee_id={}",
                actor.id, issue.id, assignee_id
            );
        }
        Ok(issue)
    }

    pub fn update_status(
        &self,
        actor: &Actor,
        id: IssueId,
        status: IssueStatus,
    ) -> ServiceResult<Issue> {
        self.update_issue(
            actor,
            id,
            IssuePatch {
                status: Some(status),
                ..IssuePatch::default()
            },
        )
    }

    pub fn update_issue(&self, actor: &Actor, id: IssueId, patch: IssuePatch) -> ServiceResult<Issue> {
        let mut issue = self.load(id)?;
        ensure_involved(actor, &issue)?;

        if let Some(title) = patch.title {
            if title.trim().is_empty() {
                return Err(ServiceError::validation("issue title must not be blank"));
            }
            issue.title = title.trim().to_string();
        }
        if let Some(description) = patch.description {
            issue.description = description;
        }
        if let Some(priority) = patch.priority {
            issue.priority = priority;
        }
        if let Some(solution) = patch.solution {
            issue.solution = Some(solution);
        }

        let now = now_epoch_ms();
        if let Some(status) = patch.status {
            issue.transition_to(status, now);
        }
        issue.updated_at = now;

        self.store.issues().update_issue(&issue)?;
        info!(
            "event=issue_update module=issues status=ok actor_id={} issue_id={} issue_status={}",
            actor.id,
            issue.id,
            issue.status.as_str()
        );
        Ok(issue)
    }

    pub fn delete_issue(&self, actor: &Actor, id: IssueId) -> ServiceResult<()> {
        let issue = self.load(id)?;
        if issue.created_by != actor.id && !actor.can_act_as_manager() {
            return Err(ServiceError::forbidden(format!(
                "actor {} is neither the creator of issue {} nor manager-class",
                actor.id, issue.id
            )));
        }
        self.store.issues().delete_issue(id)?;
        info!(
            "event=issue_delete module=issues status=ok actor_id={} issue_id={}",
            actor.id, id
        );
        Ok(())
    }

    /// Status counts over the issues `actor` may list.
    pub fn issue_stats(&self, actor: &Actor, target: Option<ActorId>) -> ServiceResult<IssueStats> {
        let issues = self.list_issues(
            actor,
            &IssueListQuery {
                target,
                ..IssueListQuery::default()
            },
        )?;
        let mut stats = IssueStats {
            total: issues.len(),
            ..IssueStats::default()
        };
        for issue in &issues {
            match issue.status {
                IssueStatus::Open => stats.open += 1,
                IssueStatus::InProgress => stats.in_progress += 1,
                IssueStatus::Resolved => stats.resolved += 1,
                IssueStatus::Closed => stats.closed += 1,
            }
        }
        Ok(stats)
    }

    fn load(&self, id: IssueId) -> ServiceResult<Issue> {
        self.store
            .issues()
            .get_issue(id)?
            .ok_or_else(|| ServiceError::not_found(ResourceKind::Issue, id))
    }
}

fn ensure_involved(actor: &Actor, issue: &Issue) -> ServiceResult<()> {
    if issue.involves(actor.id) || actor.can_act_as_manager() {
        return Ok(());
    }
    Err(ServiceError::forbidden(format!(
        "actor {} is neither the creator nor the assignee of issue {} and not manager-class",
        actor.id, issue.id
    )))
}
