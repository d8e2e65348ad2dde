//! Ranking engine.
//!
//! Aggregation runs as a parallel map over the population. The ordering
//! step is a stable sort, so actors with equal scores keep their population
//! order and ranks are the dense 1-based positions after sorting.

use crate::analytics::stats::{
    average_metric_performance, performance_score, round_half_up, ObjectiveStats,
};
use crate::model::actor::{Actor, ActorId, DepartmentId};
use crate::model::metric::Metric;
use crate::model::objective::{Objective, ObjectiveId};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashMap;

/// One population member with the records attributed to them.
#[derive(Debug, Clone)]
pub struct RankingInput<'a> {
    pub actor: &'a Actor,
    pub objectives: Vec<&'a Objective>,
    pub metrics: Vec<&'a Metric>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingRow {
    pub rank: usize,
    pub actor_id: ActorId,
    pub name: String,
    pub email: String,
    pub designation: Option<String>,
    pub department_id: Option<DepartmentId>,
    pub performance_score: i64,
    pub completion_rate: f64,
    pub average_progress: f64,
    pub total_objectives: usize,
    pub completed_objectives: usize,
}

/// Attributes bulk-loaded records to population members.
///
/// Objectives belong to their assignee. Metrics belong to the assignee of
/// their linked objective; unlinked metrics are attributed to nobody. The
/// returned inputs follow `population` order.
pub fn attribute_records<'a>(
    population: &'a [Actor],
    objectives: &'a [Objective],
    metrics: &'a [Metric],
) -> Vec<RankingInput<'a>> {
    let owner_by_objective: HashMap<ObjectiveId, ActorId> = objectives
        .iter()
        .map(|objective| (objective.id, objective.assignee_id))
        .collect();

    let mut objectives_by_owner: HashMap<ActorId, Vec<&Objective>> = HashMap::new();
    for objective in objectives {
        objectives_by_owner
            .entry(objective.assignee_id)
            .or_default()
            .push(objective);
    }

    let mut metrics_by_owner: HashMap<ActorId, Vec<&Metric>> = HashMap::new();
    for metric in metrics {
        let owner = metric
            .objective_id
            .and_then(|objective_id| owner_by_objective.get(&objective_id));
        if let Some(owner) = owner {
            metrics_by_owner.entry(*owner).or_default().push(metric);
        }
    }

    population
        .iter()
        .map(|actor| RankingInput {
            actor,
            objectives: objectives_by_owner.remove(&actor.id).unwrap_or_default(),
            metrics: metrics_by_owner.remove(&actor.id).unwrap_or_default(),
        })
        .collect()
}

/// Scores and orders `inputs`. An empty population yields an empty ranking.
pub fn rank(inputs: &[RankingInput<'_>]) -> Vec<RankingRow> {
    // `collect` on an indexed parallel iterator keeps input order.
    let mut rows: Vec<RankingRow> = inputs.par_iter().map(score_member).collect();

    rows.sort_by(|left, right| right.performance_score.cmp(&left.performance_score));
    for (position, row) in rows.iter_mut().enumerate() {
        row.rank = position + 1;
    }
    rows
}

fn score_member(input: &RankingInput<'_>) -> RankingRow {
    let stats = ObjectiveStats::aggregate(input.objectives.iter().copied());
    let kpi = average_metric_performance(input.metrics.iter().copied());
    let actor = input.actor;

    RankingRow {
        rank: 0,
        actor_id: actor.id,
        name: actor.name.clone(),
        email: actor.email.clone(),
        designation: actor.designation.clone(),
        department_id: actor.department_id,
        performance_score: performance_score(
            stats.average_progress,
            stats.completion_rate,
            kpi,
        ),
        completion_rate: round_half_up(stats.completion_rate),
        average_progress: round_half_up(stats.average_progress),
        total_objectives: stats.total,
        completed_objectives: stats.completed,
    }
}

#[cfg(test)]
mod tests {
    use super::{attribute_records, rank, RankingInput};
    use crate::model::actor::Actor;
    use crate::model::metric::Metric;
    use crate::model::objective::{Objective, ObjectiveStatus};
    use crate::model::role::Role;

    fn actor(name: &str) -> Actor {
        Actor::new(name, format!("{name}@example.org"), Role::Employee)
    }

    fn objective(owner: &Actor, status: ObjectiveStatus, progress: f64) -> Objective {
        let mut objective = Objective::new("o", owner.id, 0, 1);
        objective.status = status;
        objective.progress = progress;
        objective
    }

    #[test]
    fn empty_population_yields_empty_ranking() {
        assert!(rank(&[]).is_empty());
    }

    #[test]
    fn sorts_descending_with_dense_ranks() {
        let low = actor("low");
        let high = actor("high");
        let mid = actor("mid");
        let objectives = vec![
            objective(&low, ObjectiveStatus::InProgress, 10.0),
            objective(&high, ObjectiveStatus::Completed, 100.0),
            objective(&mid, ObjectiveStatus::InProgress, 60.0),
        ];
        let population = vec![low, high, mid];
        let inputs = attribute_records(&population, &objectives, &[]);

        let rows = rank(&inputs);
        let names: Vec<&str> = rows.iter().map(|row| row.name.as_str()).collect();
        assert_eq!(names, vec!["high", "mid", "low"]);
        let ranks: Vec<usize> = rows.iter().map(|row| row.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
        assert_eq!(rows[0].performance_score, 70);
        assert_eq!(rows[0].completion_rate, 100.0);
    }

    #[test]
    fn ties_keep_population_order() {
        let population: Vec<Actor> = ["a", "b", "c", "d"].into_iter().map(actor).collect();
        let objectives: Vec<Objective> = population
            .iter()
            .map(|member| objective(member, ObjectiveStatus::InProgress, 50.0))
            .collect();
        let inputs = attribute_records(&population, &objectives, &[]);

        let rows = rank(&inputs);
        let names: Vec<&str> = rows.iter().map(|row| row.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c", "d"]);
        let ranks: Vec<usize> = rows.iter().map(|row| row.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3, 4]);
    }

    #[test]
    fn metrics_follow_linked_objective_owner() {
        let owner = actor("owner");
        let other = actor("other");
        let goal = objective(&owner, ObjectiveStatus::InProgress, 0.0);
        let mut linked = Metric::new("kpi", "pts", 10.0);
        linked.current = 10.0;
        linked.objective_id = Some(goal.id);
        let mut unlinked = Metric::new("loose", "pts", 10.0);
        unlinked.current = 10.0;

        let population = vec![owner, other];
        let objectives = vec![goal];
        let metrics = vec![linked, unlinked];
        let inputs: Vec<RankingInput<'_>> = attribute_records(&population, &objectives, &metrics);

        assert_eq!(inputs[0].metrics.len(), 1);
        assert!(inputs[1].metrics.is_empty());
        let rows = rank(&inputs);
        assert_eq!(rows[0].name, "owner");
        assert_eq!(rows[0].performance_score, 30);
    }
}
