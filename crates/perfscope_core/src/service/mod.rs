//! Use-case services over a [`RecordStore`].
//!
//! # Responsibility
//! - Resolve scope and ownership before every read or mutation.
//! - Translate repository results into the caller-facing [`ServiceError`]
//!   taxonomy.
//!
//! # Invariants
//! - Every mutation reloads the records its authorization depends on.
//! - Not-found checks run before ownership checks.

pub mod analytics_service;
pub mod issue_service;
pub mod metric_service;
pub mod objective_service;
pub mod upload_service;

use crate::error::{ResourceKind, ServiceError, ServiceResult};
use crate::model::actor::{Actor, ActorId};
use crate::model::metric::{Metric, MetricId};
use crate::model::objective::{Objective, ObjectiveId};
use crate::repo::RecordStore;

/// Loads the acting identity, `NotFound` when it is unknown.
pub fn resolve_actor<S: RecordStore>(store: &S, id: ActorId) -> ServiceResult<Actor> {
    store
        .actors()
        .get_actor(id)?
        .ok_or_else(|| ServiceError::not_found(ResourceKind::Actor, id))
}

pub(crate) fn load_objective<S: RecordStore>(
    store: &S,
    id: ObjectiveId,
) -> ServiceResult<Objective> {
    store
        .objectives()
        .get_objective(id)?
        .ok_or_else(|| ServiceError::not_found(ResourceKind::Objective, id))
}

pub(crate) fn load_metric<S: RecordStore>(store: &S, id: MetricId) -> ServiceResult<Metric> {
    store
        .metrics()
        .get_metric(id)?
        .ok_or_else(|| ServiceError::not_found(ResourceKind::Metric, id))
}

pub(crate) fn require_manager(actor: &Actor, action: &str) -> ServiceResult<()> {
    if actor.can_act_as_manager() {
        return Ok(());
    }
    Err(ServiceError::forbidden(format!(
        "actor {} must be manager-class to {action}",
        actor.id
    )))
}
