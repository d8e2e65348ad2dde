//! Metric repository contracts and SQLite implementation.
//!
//! # Invariants
//! - A metric's owner is the assignee of its linked objective; owner
//!   filtering joins through `objectives`.
//! - Listing order is insertion order (`rowid`).

use crate::db::migrations::ensure_latest;
use crate::model::actor::{ActorId, DepartmentId};
use crate::model::metric::{Metric, MetricCadence, MetricId, MetricTrend};
use crate::model::objective::ObjectiveId;
use crate::repo::{parse_label, parse_optional_uuid, parse_uuid, RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const METRIC_SELECT_SQL: &str = "SELECT
    m.id AS id,
    m.name AS name,
    m.description AS description,
    m.unit AS unit,
    m.target AS target,
    m.current AS current,
    m.baseline AS baseline,
    m.cadence AS cadence,
    m.category AS category,
    m.trend AS trend,
    m.department_id AS department_id,
    m.objective_id AS objective_id,
    m.last_updated AS last_updated,
    m.created_at AS created_at
FROM metrics m
LEFT JOIN objectives o ON o.id = m.objective_id";

/// Filter for metric listing. Empty filter lists everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricFilter {
    /// Assignee of the linked objective.
    pub owner_id: Option<ActorId>,
    pub department_id: Option<DepartmentId>,
    pub objective_id: Option<ObjectiveId>,
}

/// Repository interface for metric CRUD operations.
pub trait MetricRepository {
    fn create_metric(&self, metric: &Metric) -> RepoResult<MetricId>;
    fn update_metric(&self, metric: &Metric) -> RepoResult<()>;
    fn get_metric(&self, id: MetricId) -> RepoResult<Option<Metric>>;
    fn list_metrics(&self, filter: &MetricFilter) -> RepoResult<Vec<Metric>>;
    fn delete_metric(&self, id: MetricId) -> RepoResult<()>;
}

/// SQLite-backed metric repository.
pub struct SqliteMetricRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteMetricRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_latest(conn)?;
        Ok(Self { conn })
    }
}

impl MetricRepository for SqliteMetricRepository<'_> {
    fn create_metric(&self, metric: &Metric) -> RepoResult<MetricId> {
        metric.validate()?;

        self.conn.execute(
            "INSERT INTO metrics (
                id,
                name,
                description,
                unit,
                target,
                current,
                baseline,
                cadence,
                category,
                trend,
                department_id,
                objective_id,
                last_updated,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14);",
            params![
                metric.id.to_string(),
                metric.name.as_str(),
                metric.description.as_str(),
                metric.unit.as_str(),
                metric.target,
                metric.current,
                metric.baseline,
                metric.cadence.as_str(),
                metric.category.as_str(),
                metric.trend.as_str(),
                metric.department_id.map(|id| id.to_string()),
                metric.objective_id.map(|id| id.to_string()),
                metric.last_updated,
                metric.created_at,
            ],
        )?;
        Ok(metric.id)
    }

    fn update_metric(&self, metric: &Metric) -> RepoResult<()> {
        metric.validate()?;

        let changed = self.conn.execute(
            "UPDATE metrics
             SET
                name = ?1,
                description = ?2,
                unit = ?3,
                target = ?4,
                current = ?5,
                baseline = ?6,
                cadence = ?7,
                category = ?8,
                trend = ?9,
                department_id = ?10,
                objective_id = ?11,
                last_updated = ?12
             WHERE id = ?13;",
            params![
                metric.name.as_str(),
                metric.description.as_str(),
                metric.unit.as_str(),
                metric.target,
                metric.current,
                metric.baseline,
                metric.cadence.as_str(),
                metric.category.as_str(),
                metric.trend.as_str(),
                metric.department_id.map(|id| id.to_string()),
                metric.objective_id.map(|id| id.to_string()),
                metric.last_updated,
                metric.id.to_string(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                table: "metrics",
                id: metric.id,
            });
        }
        Ok(())
    }

    fn get_metric(&self, id: MetricId) -> RepoResult<Option<Metric>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{METRIC_SELECT_SQL} WHERE m.id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_metric_row(row)?));
        }
        Ok(None)
    }

    fn list_metrics(&self, filter: &MetricFilter) -> RepoResult<Vec<Metric>> {
        let mut sql = format!("{METRIC_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(owner_id) = filter.owner_id {
            sql.push_str(" AND o.assignee_id = ?");
            bind_values.push(Value::Text(owner_id.to_string()));
        }
        if let Some(department_id) = filter.department_id {
            sql.push_str(" AND m.department_id = ?");
            bind_values.push(Value::Text(department_id.to_string()));
        }
        if let Some(objective_id) = filter.objective_id {
            sql.push_str(" AND m.objective_id = ?");
            bind_values.push(Value::Text(objective_id.to_string()));
        }
        sql.push_str(" ORDER BY m.rowid ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut metrics = Vec::new();
        while let Some(row) = rows.next()? {
            metrics.push(parse_metric_row(row)?);
        }
        Ok(metrics)
    }

    fn delete_metric(&self, id: MetricId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM metrics WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                table: "metrics",
                id,
            });
        }
        Ok(())
    }
}

fn parse_metric_row(row: &Row<'_>) -> RepoResult<Metric> {
    let id_text: String = row.get("id")?;
    let cadence_text: String = row.get("cadence")?;
    let trend_text: String = row.get("trend")?;

    let metric = Metric {
        id: parse_uuid(&id_text, "metrics.id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        unit: row.get("unit")?,
        target: row.get("target")?,
        current: row.get("current")?,
        baseline: row.get("baseline")?,
        cadence: parse_label(&cadence_text, "metrics.cadence", MetricCadence::parse)?,
        category: row.get("category")?,
        trend: parse_label(&trend_text, "metrics.trend", MetricTrend::parse)?,
        department_id: parse_optional_uuid(row.get("department_id")?, "metrics.department_id")?,
        objective_id: parse_optional_uuid(row.get("objective_id")?, "metrics.objective_id")?,
        last_updated: row.get("last_updated")?,
        created_at: row.get("created_at")?,
    };
    metric.validate()?;
    Ok(metric)
}
