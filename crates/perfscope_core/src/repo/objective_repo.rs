//! Objective repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Writes call `Objective::validate()` first.
//! - Listing order is insertion order (`rowid`), which keeps per-actor
//!   aggregation and ranking tie order reproducible.

use crate::db::migrations::ensure_latest;
use crate::model::actor::{ActorId, DepartmentId};
use crate::model::objective::{
    Objective, ObjectiveId, ObjectiveKind, ObjectivePriority, ObjectiveStatus,
};
use crate::repo::{parse_label, parse_optional_uuid, parse_uuid, RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const OBJECTIVE_SELECT_SQL: &str = "SELECT
    id,
    title,
    description,
    kind,
    status,
    priority,
    progress,
    start_date,
    end_date,
    department_id,
    assignee_id,
    parent_id,
    created_at,
    updated_at
FROM objectives";

/// Filter for objective listing. Empty filter lists everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectiveFilter {
    pub assignee_id: Option<ActorId>,
    pub department_id: Option<DepartmentId>,
    pub status: Option<ObjectiveStatus>,
}

/// Repository interface for objective CRUD operations.
pub trait ObjectiveRepository {
    fn create_objective(&self, objective: &Objective) -> RepoResult<ObjectiveId>;
    fn update_objective(&self, objective: &Objective) -> RepoResult<()>;
    fn get_objective(&self, id: ObjectiveId) -> RepoResult<Option<Objective>>;
    fn list_objectives(&self, filter: &ObjectiveFilter) -> RepoResult<Vec<Objective>>;
    fn delete_objective(&self, id: ObjectiveId) -> RepoResult<()>;
}

/// SQLite-backed objective repository.
pub struct SqliteObjectiveRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteObjectiveRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_latest(conn)?;
        Ok(Self { conn })
    }
}

impl ObjectiveRepository for SqliteObjectiveRepository<'_> {
    fn create_objective(&self, objective: &Objective) -> RepoResult<ObjectiveId> {
        objective.validate()?;

        self.conn.execute(
            "INSERT INTO objectives (
                id,
                title,
                description,
                kind,
                status,
                priority,
                progress,
                start_date,
                end_date,
                department_id,
                assignee_id,
                parent_id,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14);",
            params![
                objective.id.to_string(),
                objective.title.as_str(),
                objective.description.as_str(),
                objective.kind.as_str(),
                objective.status.as_str(),
                objective.priority.as_str(),
                objective.progress,
                objective.start_date,
                objective.end_date,
                objective.department_id.map(|id| id.to_string()),
                objective.assignee_id.to_string(),
                objective.parent_id.map(|id| id.to_string()),
                objective.created_at,
                objective.updated_at,
            ],
        )?;

        Ok(objective.id)
    }

    fn update_objective(&self, objective: &Objective) -> RepoResult<()> {
        objective.validate()?;

        let changed = self.conn.execute(
            "UPDATE objectives
             SET
                title = ?1,
                description = ?2,
                kind = ?3,
                status = ?4,
                priority = ?5,
                progress = ?6,
                start_date = ?7,
                end_date = ?8,
                department_id = ?9,
                assignee_id = ?10,
                parent_id = ?11,
                updated_at = ?12
             WHERE id = ?13;",
            params![
                objective.title.as_str(),
                objective.description.as_str(),
                objective.kind.as_str(),
                objective.status.as_str(),
                objective.priority.as_str(),
                objective.progress,
                objective.start_date,
                objective.end_date,
                objective.department_id.map(|id| id.to_string()),
                objective.assignee_id.to_string(),
                objective.parent_id.map(|id| id.to_string()),
                objective.updated_at,
                objective.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                table: "objectives",
                id: objective.id,
            });
        }
        Ok(())
    }

    fn get_objective(&self, id: ObjectiveId) -> RepoResult<Option<Objective>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{OBJECTIVE_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_objective_row(row)?));
        }
        Ok(None)
    }

    fn list_objectives(&self, filter: &ObjectiveFilter) -> RepoResult<Vec<Objective>> {
        let mut sql = format!("{OBJECTIVE_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(assignee_id) = filter.assignee_id {
            sql.push_str(" AND assignee_id = ?");
            bind_values.push(Value::Text(assignee_id.to_string()));
        }
        if let Some(department_id) = filter.department_id {
            sql.push_str(" AND department_id = ?");
            bind_values.push(Value::Text(department_id.to_string()));
        }
        if let Some(status) = filter.status {
            sql.push_str(" AND status = ?");
            bind_values.push(Value::Text(status.as_str().to_string()));
        }
        sql.push_str(" ORDER BY rowid ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut objectives = Vec::new();
        while let Some(row) = rows.next()? {
            objectives.push(parse_objective_row(row)?);
        }
        Ok(objectives)
    }

    fn delete_objective(&self, id: ObjectiveId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM objectives WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                table: "objectives",
                id,
            });
        }
        Ok(())
    }
}

fn parse_objective_row(row: &Row<'_>) -> RepoResult<Objective> {
    let id_text: String = row.get("id")?;
    let kind_text: String = row.get("kind")?;
    let status_text: String = row.get("status")?;
    let priority_text: String = row.get("priority")?;
    let assignee_text: String = row.get("assignee_id")?;

    let objective = Objective {
        id: parse_uuid(&id_text, "objectives.id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        kind: parse_label(&kind_text, "objectives.kind", ObjectiveKind::parse)?,
        status: parse_label(&status_text, "objectives.status", ObjectiveStatus::parse)?,
        priority: parse_label(
            &priority_text,
            "objectives.priority",
            ObjectivePriority::parse,
        )?,
        progress: row.get("progress")?,
        start_date: row.get("start_date")?,
        end_date: row.get("end_date")?,
        department_id: parse_optional_uuid(
            row.get("department_id")?,
            "objectives.department_id",
        )?,
        assignee_id: parse_uuid(&assignee_text, "objectives.assignee_id")?,
        parent_id: parse_optional_uuid(row.get("parent_id")?, "objectives.parent_id")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };
    objective.validate()?;
    Ok(objective)
}
