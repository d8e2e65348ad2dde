//! Metric use-case service.
//!
//! Writes are allowed to manager-class actors and to the assignee of the
//! linked objective. Unlinked metrics are manager-only.

use crate::access::scope::{resolve_scope, ScopeRequest};
use crate::error::{ServiceError, ServiceResult};
use crate::model::actor::{Actor, ActorId, DepartmentId};
use crate::model::metric::{Metric, MetricCadence, MetricId, MetricTrend};
use crate::model::now_epoch_ms;
use crate::model::objective::ObjectiveId;
use crate::model::ValidationError;
use crate::repo::RecordStore;
use crate::service::{load_metric, load_objective};
use log::info;

#[derive(Debug, Clone, PartialEq)]
pub struct NewMetric {
    pub name: String,
    pub description: String,
    pub unit: String,
    pub target: f64,
    pub current: f64,
    pub baseline: f64,
    pub cadence: MetricCadence,
    pub category: String,
    pub department_id: Option<DepartmentId>,
    pub objective_id: Option<ObjectiveId>,
}

impl NewMetric {
    pub fn new(name: impl Into<String>, unit: impl Into<String>, target: f64) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            unit: unit.into(),
            target,
            current: 0.0,
            baseline: 0.0,
            cadence: MetricCadence::Monthly,
            category: String::new(),
            department_id: None,
            objective_id: None,
        }
    }
}

/// New readings for an existing metric.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MetricValues {
    pub current: Option<f64>,
    pub target: Option<f64>,
    pub baseline: Option<f64>,
    pub trend: Option<MetricTrend>,
}

pub struct MetricService<S: RecordStore> {
    store: S,
}

impl<S: RecordStore> MetricService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn create_metric(&self, actor: &Actor, input: NewMetric) -> ServiceResult<Metric> {
        let owner = self.ensure_may_write(actor, input.objective_id)?;

        let mut metric = Metric::new(input.name.trim(), input.unit, input.target);
        metric.description = input.description;
        metric.current = input.current;
        metric.baseline = input.baseline;
        metric.cadence = input.cadence;
        metric.category = input.category;
        metric.objective_id = input.objective_id;
        metric.department_id = input.department_id.or(owner.and_then(|(_, dept)| dept));
        metric.validate().map_err(ValidationError::from)?;

        self.store.metrics().create_metric(&metric)?;
        info!(
            "event=metric_create module=metrics status=ok actor_id={} metric_id={}",
            actor.id, metric.id
        );
        Ok(metric)
    }

    /// One metric within the actor's scope.
    pub fn get_metric(&self, actor: &Actor, id: MetricId) -> ServiceResult<Metric> {
        let metric = load_metric(&self.store, id)?;
        if !actor.can_act_as_manager() && self.owner_of(&metric)? != Some(actor.id) {
            return Err(ServiceError::forbidden(format!(
                "actor {} does not own the objective linked to metric {}",
                actor.id, metric.id
            )));
        }
        Ok(metric)
    }

    pub fn list_metrics(&self, actor: &Actor, target: Option<ActorId>) -> ServiceResult<Vec<Metric>> {
        let scope = resolve_scope(actor, &ScopeRequest::for_target(target));
        Ok(self.store.metrics().list_metrics(&scope.metric_filter())?)
    }

    /// Records new readings. A changed `current` bumps `last_updated`.
    pub fn update_values(
        &self,
        actor: &Actor,
        id: MetricId,
        values: MetricValues,
    ) -> ServiceResult<Metric> {
        let mut metric = load_metric(&self.store, id)?;
        self.ensure_may_write(actor, metric.objective_id)?;

        if let Some(current) = values.current {
            if current != metric.current {
                metric.last_updated = now_epoch_ms();
            }
            metric.current = current;
        }
        if let Some(target) = values.target {
            metric.target = target;
        }
        if let Some(baseline) = values.baseline {
            metric.baseline = baseline;
        }
        if let Some(trend) = values.trend {
            metric.trend = trend;
        }
        metric.validate().map_err(ValidationError::from)?;

        self.store.metrics().update_metric(&metric)?;
        info!(
            "event=metric_update module=metrics status=ok actor_id={} metric_id={}",
            actor.id, metric.id
        );
        Ok(metric)
    }

    pub fn delete_metric(&self, actor: &Actor, id: MetricId) -> ServiceResult<()> {
        let metric = load_metric(&self.store, id)?;
        self.ensure_may_write(actor, metric.objective_id)?;
        self.store.metrics().delete_metric(id)?;
        info!(
            "event=metric_delete module=metrics status=ok actor_id={} metric_id={}",
            actor.id, id
        );
        Ok(())
    }

    fn owner_of(&self, metric: &Metric) -> ServiceResult<Option<ActorId>> {
        match metric.objective_id {
            Some(objective_id) => Ok(self
                .store
                .objectives()
                .get_objective(objective_id)?
                .map(|objective| objective.assignee_id)),
            None => Ok(None),
        }
    }

    /// Returns the linked objective's `(assignee, department)` when present.
    fn ensure_may_write(
        &self,
        actor: &Actor,
        objective_id: Option<ObjectiveId>,
    ) -> ServiceResult<Option<(ActorId, Option<DepartmentId>)>> {
        let owner = match objective_id {
            Some(objective_id) => {
                let objective = load_objective(&self.store, objective_id)?;
                Some((objective.assignee_id, objective.department_id))
            }
            None => None,
        };
        let is_owner = owner.is_some_and(|(assignee_id, _)| assignee_id == actor.id);
        if actor.can_act_as_manager() || is_owner {
            return Ok(owner);
        }
        Err(ServiceError::forbidden(format!(
            "actor {} is neither the assignee of the linked objective nor manager-class",
            actor.id
        )))
    }
}
