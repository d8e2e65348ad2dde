//! Objective use-case service.
//!
//! # Invariants
//! - A non-manager creates objectives only for themselves.
//! - Mutations require the assignee or a manager-class actor.
//! - Parent links never form a cycle.

use crate::access::owns_or_manages;
use crate::access::scope::{resolve_scope, ScopeRequest};
use crate::error::{ServiceError, ServiceResult};
use crate::model::actor::{Actor, ActorId, DepartmentId};
use crate::model::now_epoch_ms;
use crate::model::objective::{
    Objective, ObjectiveId, ObjectiveKind, ObjectivePriority, ObjectiveStatus,
};
use crate::model::ValidationError;
use crate::repo::RecordStore;
use crate::service::{load_objective, require_manager, resolve_actor};
use log::info;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq)]
pub struct NewObjective {
    pub title: String,
    pub description: String,
    pub kind: ObjectiveKind,
    pub priority: ObjectivePriority,
    pub status: ObjectiveStatus,
    pub progress: f64,
    pub start_date: i64,
    pub end_date: i64,
    /// Defaults to the assignee's department.
    pub department_id: Option<DepartmentId>,
    /// Defaults to the creating actor.
    pub assignee_id: Option<ActorId>,
    pub parent_id: Option<ObjectiveId>,
}

impl NewObjective {
    pub fn new(title: impl Into<String>, start_date: i64, end_date: i64) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            kind: ObjectiveKind::Specific,
            priority: ObjectivePriority::Medium,
            status: ObjectiveStatus::NotStarted,
            progress: 0.0,
            start_date,
            end_date,
            department_id: None,
            assignee_id: None,
            parent_id: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectivePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<ObjectiveStatus>,
    pub priority: Option<ObjectivePriority>,
    pub progress: Option<f64>,
    pub start_date: Option<i64>,
    pub end_date: Option<i64>,
    /// Reassignment; manager-class only.
    pub assignee_id: Option<ActorId>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ObjectiveListQuery {
    pub target: Option<ActorId>,
    pub department_wide: bool,
    pub status: Option<ObjectiveStatus>,
}

pub struct ObjectiveService<S: RecordStore> {
    store: S,
}

impl<S: RecordStore> ObjectiveService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn create_objective(&self, actor: &Actor, input: NewObjective) -> ServiceResult<Objective> {
        let assignee_id = input.assignee_id.unwrap_or(actor.id);
        let assignee = resolve_actor(&self.store, assignee_id)?;
        if assignee.id != actor.id {
            require_manager(actor, "create objectives for other actors")?;
        }

        let mut objective = Objective::new(
            input.title.trim(),
            assignee.id,
            input.start_date,
            input.end_date,
        );
        objective.description = input.description;
        objective.kind = input.kind;
        objective.priority = input.priority;
        objective.status = input.status;
        objective.progress = input.progress;
        objective.department_id = input.department_id.or(assignee.department_id);
        objective.validate().map_err(ValidationError::from)?;

        if let Some(parent_id) = input.parent_id {
            load_objective(&self.store, parent_id)?;
            objective.parent_id = Some(parent_id);
        }

        self.store.objectives().create_objective(&objective)?;
        info!(
            "event=objective_create module=objectives status=ok actor_id={} objective_id={} assignee_id={}",
            actor.id, objective.id, assignee.id
        );
        Ok(objective)
    }

    pub fn get_objective(&self, actor: &Actor, id: ObjectiveId) -> ServiceResult<Objective> {
        let objective = load_objective(&self.store, id)?;
        ensure_owner_or_manager(actor, &objective, "read")?;
        Ok(objective)
    }

    pub fn list_objectives(
        &self,
        actor: &Actor,
        query: &ObjectiveListQuery,
    ) -> ServiceResult<Vec<Objective>> {
        let scope = resolve_scope(
            actor,
            &ScopeRequest {
                target: query.target,
                department_wide: query.department_wide,
            },
        );
        let mut filter = scope.objective_filter();
        filter.status = query.status;
        Ok(self.store.objectives().list_objectives(&filter)?)
    }

    pub fn update_objective(
        &self,
        actor: &Actor,
        id: ObjectiveId,
        patch: ObjectivePatch,
    ) -> ServiceResult<Objective> {
        let mut objective = load_objective(&self.store, id)?;
        ensure_owner_or_manager(actor, &objective, "update")?;

        if let Some(assignee_id) = patch.assignee_id {
            if assignee_id != objective.assignee_id {
                require_manager(actor, "reassign objectives")?;
                resolve_actor(&self.store, assignee_id)?;
                objective.assignee_id = assignee_id;
            }
        }
        if let Some(title) = patch.title {
            objective.title = title.trim().to_string();
        }
        if let Some(description) = patch.description {
            objective.description = description;
        }
        if let Some(status) = patch.status {
            objective.status = status;
        }
        if let Some(priority) = patch.priority {
            objective.priority = priority;
        }
        if let Some(progress) = patch.progress {
            objective.progress = progress;
        }
        if let Some(start_date) = patch.start_date {
            objective.start_date = start_date;
        }
        if let Some(end_date) = patch.end_date {
            objective.end_date = end_date;
        }
        objective.updated_at = now_epoch_ms();
        objective.validate().map_err(ValidationError::from)?;

        self.store.objectives().update_objective(&objective)?;
        info!(
            "event=objective_update module=objectives status=ok actor_id={} objective_id={}",
            actor.id, objective.id
        );
        Ok(objective)
    }

    pub fn delete_objective(&self, actor: &Actor, id: ObjectiveId) -> ServiceResult<()> {
        let objective = load_objective(&self.store, id)?;
        ensure_owner_or_manager(actor, &objective, "delete")?;
        self.store.objectives().delete_objective(id)?;
        info!(
            "event=objective_delete module=objectives status=ok actor_id={} objective_id={}",
            actor.id, id
        );
        Ok(())
    }

    /// Links `id` under `parent_id`, or detaches it when `parent_id` is `None`.
    pub fn set_parent(
        &self,
        actor: &Actor,
        id: ObjectiveId,
        parent_id: Option<ObjectiveId>,
    ) -> ServiceResult<Objective> {
        let mut objective = load_objective(&self.store, id)?;
        if let Some(parent_id) = parent_id {
            load_objective(&self.store, parent_id)?;
        }
        ensure_owner_or_manager(actor, &objective, "re-parent")?;

        if let Some(parent_id) = parent_id {
            if self.would_create_cycle(id, parent_id)? {
                return Err(ServiceError::validation(format!(
                    "parent {parent_id} would create a cycle under objective {id}"
                )));
            }
        }

        objective.parent_id = parent_id;
        objective.updated_at = now_epoch_ms();
        self.store.objectives().update_objective(&objective)?;
        info!(
            "event=objective_set_parent module=objectives status=ok actor_id={} objective_id={}",
            actor.id, id
        );
        Ok(objective)
    }

    fn would_create_cycle(
        &self,
        objective_id: ObjectiveId,
        candidate_parent_id: ObjectiveId,
    ) -> ServiceResult<bool> {
        let mut visited = HashSet::new();
        let mut cursor = Some(candidate_parent_id);
        while let Some(current) = cursor {
            if current == objective_id || !visited.insert(current) {
                return Ok(true);
            }
            cursor = load_objective(&self.store, current)?.parent_id;
        }
        Ok(false)
    }
}

fn ensure_owner_or_manager(actor: &Actor, objective: &Objective, action: &str) -> ServiceResult<()> {
    if owns_or_manages(actor, objective.assignee_id) {
        return Ok(());
    }
    Err(ServiceError::forbidden(format!(
        "actor {} may not {action} objective {}: not its assignee and not manager-class",
        actor.id, objective.id
    )))
}
