//! Metric ("KPI") record.
//!
//! # Invariants
//! - `target`, `current` and `baseline` are finite numbers.
//! - A metric is owned through its linked objective's assignee; unlinked
//!   metrics belong to no actor.

use crate::model::actor::DepartmentId;
use crate::model::now_epoch_ms;
use crate::model::objective::ObjectiveId;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable metric identifier.
pub type MetricId = Uuid;

/// Measurement cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricCadence {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl MetricCadence {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Yearly => "yearly",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "daily" => Some(Self::Daily),
            "weekly" => Some(Self::Weekly),
            "monthly" => Some(Self::Monthly),
            "quarterly" => Some(Self::Quarterly),
            "yearly" => Some(Self::Yearly),
            _ => None,
        }
    }
}

/// Direction the metric moved since the last reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricTrend {
    Up,
    Down,
    Stable,
}

impl MetricTrend {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Stable => "stable",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "up" => Some(Self::Up),
            "down" => Some(Self::Down),
            "stable" => Some(Self::Stable),
            _ => None,
        }
    }
}

/// Quantitative indicator with baseline/current/target readings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub id: MetricId,
    pub name: String,
    pub description: String,
    pub unit: String,
    pub target: f64,
    pub current: f64,
    pub baseline: f64,
    pub cadence: MetricCadence,
    pub category: String,
    pub trend: MetricTrend,
    pub department_id: Option<DepartmentId>,
    pub objective_id: Option<ObjectiveId>,
    /// Epoch milliseconds of the last `current` change.
    pub last_updated: i64,
    pub created_at: i64,
}

impl Metric {
    pub fn new(name: impl Into<String>, unit: impl Into<String>, target: f64) -> Self {
        let now = now_epoch_ms();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: String::new(),
            unit: unit.into(),
            target,
            current: 0.0,
            baseline: 0.0,
            cadence: MetricCadence::Monthly,
            category: String::new(),
            trend: MetricTrend::Stable,
            department_id: None,
            objective_id: None,
            last_updated: now,
            created_at: now,
        }
    }

    /// Attainment as a percentage of target.
    ///
    /// A zero target or any non-finite input yields `0.0` rather than
    /// `inf`/`NaN`. Overachievement is not capped.
    pub fn performance(&self) -> f64 {
        if self.target == 0.0 {
            return 0.0;
        }
        let value = self.current / self.target * 100.0;
        if value.is_finite() {
            value
        } else {
            0.0
        }
    }

    pub fn validate(&self) -> Result<(), MetricValidationError> {
        if self.name.trim().is_empty() {
            return Err(MetricValidationError::BlankName);
        }
        for (field, value) in [
            ("target", self.target),
            ("current", self.current),
            ("baseline", self.baseline),
        ] {
            if !value.is_finite() {
                return Err(MetricValidationError::NonFiniteValue(field));
            }
        }
        Ok(())
    }
}

/// Metric validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetricValidationError {
    BlankName,
    NonFiniteValue(&'static str),
}

impl Display for MetricValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName => write!(f, "metric name must not be blank"),
            Self::NonFiniteValue(field) => write!(f, "metric `{field}` must be a finite number"),
        }
    }
}

impl Error for MetricValidationError {}
