//! Statistics aggregator.

use crate::model::metric::Metric;
use crate::model::objective::{Objective, ObjectiveStatus, PROGRESS_MAX, PROGRESS_MIN};
use serde::Serialize;

const PROGRESS_WEIGHT: f64 = 0.4;
const COMPLETION_WEIGHT: f64 = 0.3;
const KPI_WEIGHT: f64 = 0.3;

/// Status counts and derived rates over one set of objectives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ObjectiveStats {
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
    pub delayed: usize,
    pub not_started: usize,
    /// `completed / total * 100`, 0 when `total == 0`.
    pub completion_rate: f64,
    /// Mean progress, 0 when `total == 0`.
    pub average_progress: f64,
}

impl ObjectiveStats {
    pub fn aggregate<'a, I>(objectives: I) -> Self
    where
        I: IntoIterator<Item = &'a Objective>,
    {
        let mut stats = Self::default();
        let mut progress_sum = 0.0;

        for objective in objectives {
            stats.total += 1;
            progress_sum += objective.progress;
            match objective.status {
                ObjectiveStatus::Completed => stats.completed += 1,
                ObjectiveStatus::InProgress => stats.in_progress += 1,
                ObjectiveStatus::Delayed => stats.delayed += 1,
                ObjectiveStatus::NotStarted => stats.not_started += 1,
            }
        }

        if stats.total > 0 {
            let total = stats.total as f64;
            stats.completion_rate = clamp_percent(stats.completed as f64 / total * 100.0);
            stats.average_progress = clamp_percent(progress_sum / total);
        }
        stats
    }
}

/// Mean of per-metric `current / target * 100`.
///
/// A metric with a zero target or non-finite values contributes 0. Returns 0
/// for an empty set.
pub fn average_metric_performance<'a, I>(metrics: I) -> f64
where
    I: IntoIterator<Item = &'a Metric>,
{
    let (sum, count) = metrics
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), metric| {
            (sum + metric.performance(), count + 1)
        });
    if count == 0 {
        return 0.0;
    }
    let mean = sum / count as f64;
    if mean.is_finite() {
        mean
    } else {
        0.0
    }
}

/// Rounds halves away from negative infinity (`2.5 -> 3`, `-2.5 -> -2`).
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Weighted 40/30/30 score, rounded half-up.
pub fn performance_score(average_progress: f64, completion_rate: f64, kpi_performance: f64) -> i64 {
    let weighted = average_progress * PROGRESS_WEIGHT
        + completion_rate * COMPLETION_WEIGHT
        + kpi_performance * KPI_WEIGHT;
    if !weighted.is_finite() {
        return 0;
    }
    round_half_up(weighted) as i64
}

fn clamp_percent(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(PROGRESS_MIN, PROGRESS_MAX)
    } else {
        PROGRESS_MIN
    }
}

/// Dashboard summary for one resolved scope.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Overview {
    /// Average metric performance, rounded half-up.
    pub productivity_score: i64,
    pub performance_score: i64,
    pub completion_rate: f64,
    pub average_progress: f64,
    pub total_objectives: usize,
    pub completed_objectives: usize,
    pub in_progress_objectives: usize,
    pub delayed_objectives: usize,
}

impl Overview {
    pub fn compute(objectives: &[Objective], metrics: &[Metric]) -> Self {
        let stats = ObjectiveStats::aggregate(objectives);
        let kpi = average_metric_performance(metrics);
        Self {
            productivity_score: round_half_up(kpi) as i64,
            performance_score: performance_score(
                stats.average_progress,
                stats.completion_rate,
                kpi,
            ),
            completion_rate: stats.completion_rate,
            average_progress: stats.average_progress,
            total_objectives: stats.total,
            completed_objectives: stats.completed,
            in_progress_objectives: stats.in_progress,
            delayed_objectives: stats.delayed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        average_metric_performance, performance_score, round_half_up, ObjectiveStats, Overview,
    };
    use crate::model::metric::Metric;
    use crate::model::objective::{Objective, ObjectiveStatus};
    use uuid::Uuid;

    fn objective(status: ObjectiveStatus, progress: f64) -> Objective {
        let mut objective = Objective::new("o", Uuid::nil(), 0, 1);
        objective.status = status;
        objective.progress = progress;
        objective
    }

    fn metric(current: f64, target: f64) -> Metric {
        let mut metric = Metric::new("m", "pts", target);
        metric.current = current;
        metric
    }

    #[test]
    fn empty_set_is_all_zero() {
        let none: Vec<Objective> = Vec::new();
        let stats = ObjectiveStats::aggregate(&none);
        assert_eq!(stats, ObjectiveStats::default());
        assert_eq!(stats.completion_rate, 0.0);
        assert_eq!(stats.average_progress, 0.0);
        let no_metrics: Vec<Metric> = Vec::new();
        assert_eq!(average_metric_performance(&no_metrics), 0.0);
    }

    #[test]
    fn mixed_statuses_aggregate() {
        let objectives = [
            objective(ObjectiveStatus::Completed, 100.0),
            objective(ObjectiveStatus::Completed, 100.0),
            objective(ObjectiveStatus::InProgress, 50.0),
            objective(ObjectiveStatus::Delayed, 30.0),
        ];
        let stats = ObjectiveStats::aggregate(&objectives);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.completed, 2);
        assert_eq!(stats.in_progress, 1);
        assert_eq!(stats.delayed, 1);
        assert_eq!(stats.not_started, 0);
        assert_eq!(stats.completion_rate, 50.0);
        assert_eq!(stats.average_progress, 70.0);
    }

    #[test]
    fn weighted_score_matches_formula() {
        assert_eq!(performance_score(70.0, 50.0, 90.0), 70);
        assert_eq!(performance_score(0.0, 0.0, 0.0), 0);
        // 0.4 * 1.25 = 0.5 rounds up.
        assert_eq!(performance_score(1.25, 0.0, 0.0), 1);
        assert_eq!(performance_score(f64::NAN, 0.0, 0.0), 0);
    }

    #[test]
    fn half_values_round_up() {
        assert_eq!(round_half_up(2.5), 3.0);
        assert_eq!(round_half_up(2.4999), 2.0);
        assert_eq!(round_half_up(-2.5), -2.0);
    }

    #[test]
    fn zero_target_metric_counts_as_zero() {
        let metrics = [metric(50.0, 100.0), metric(10.0, 0.0)];
        assert_eq!(average_metric_performance(&metrics), 25.0);
    }

    #[test]
    fn overview_combines_objectives_and_metrics() {
        let objectives = [
            objective(ObjectiveStatus::Completed, 100.0),
            objective(ObjectiveStatus::InProgress, 40.0),
        ];
        let metrics = [metric(45.0, 50.0)];
        let overview = Overview::compute(&objectives, &metrics);
        assert_eq!(overview.total_objectives, 2);
        assert_eq!(overview.completed_objectives, 1);
        assert_eq!(overview.completion_rate, 50.0);
        assert_eq!(overview.average_progress, 70.0);
        assert_eq!(overview.productivity_score, 90);
        assert_eq!(overview.performance_score, 70);
    }
}
