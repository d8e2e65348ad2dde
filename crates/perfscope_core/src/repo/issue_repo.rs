//! Issue repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Writes call `Issue::validate()` first.
//! - Listing order is newest first: `created_at DESC, rowid DESC`.

use crate::db::migrations::ensure_latest;
use crate::model::actor::{ActorId, DepartmentId};
use crate::model::issue::{Issue, IssueId, IssuePriority, IssueStatus};
use crate::repo::{parse_label, parse_optional_uuid, parse_uuid, RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const ISSUE_SELECT_SQL: &str = "SELECT
    i.id AS id,
    i.title AS title,
    i.description AS description,
    i.status AS status,
    i.priority AS priority,
    i.solution AS solution,
    i.created_by AS created_by,
    i.assignee_id AS assignee_id,
    i.objective_id AS objective_id,
    i.metric_id AS metric_id,
    i.resolved_at AS resolved_at,
    i.created_at AS created_at,
    i.updated_at AS updated_at
FROM issues i
JOIN actors creator ON creator.id = i.created_by";

/// Filter for issue listing. Empty filter lists everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueFilter {
    /// Issues created by or assigned to this actor.
    pub involving: Option<ActorId>,
    /// Issues whose creator belongs to this department.
    pub department_id: Option<DepartmentId>,
    pub status: Option<IssueStatus>,
}

/// Repository interface for issue CRUD operations.
pub trait IssueRepository {
    fn create_issue(&self, issue: &Issue) -> RepoResult<IssueId>;
    fn update_issue(&self, issue: &Issue) -> RepoResult<()>;
    fn get_issue(&self, id: IssueId) -> RepoResult<Option<Issue>>;
    fn list_issues(&self, filter: &IssueFilter) -> RepoResult<Vec<Issue>>;
    fn delete_issue(&self, id: IssueId) -> RepoResult<()>;
}

/// SQLite-backed issue repository.
pub struct SqliteIssueRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteIssueRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_latest(conn)?;
        Ok(Self { conn })
    }
}

impl IssueRepository for SqliteIssueRepository<'_> {
    fn create_issue(&self, issue: &Issue) -> RepoResult<IssueId> {
        issue.validate()?;

        self.conn.execute(
            "INSERT INTO issues (
                id,
                title,
                description,
                status,
                priority,
                solution,
                created_by,
                assignee_id,
                objective_id,
                metric_id,
                resolved_at,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13);",
            params![
                issue.id.to_string(),
                issue.title.as_str(),
                issue.description.as_str(),
                issue.status.as_str(),
                issue.priority.as_str(),
                issue.solution.as_deref(),
                issue.created_by.to_string(),
                issue.assignee_id.map(|id| id.to_string()),
                issue.objective_id.map(|id| id.to_string()),
                issue.metric_id.map(|id| id.to_string()),
                issue.resolved_at,
                issue.created_at,
                issue.updated_at,
            ],
        )?;
        Ok(issue.id)
    }

    fn update_issue(&self, issue: &Issue) -> RepoResult<()> {
        issue.validate()?;

        let changed = self.conn.execute(
            "UPDATE issues
             SET
                title = ?1,
                description = ?2,
                status = ?3,
                priority = ?4,
                solution = ?5,
                assignee_id = ?6,
                objective_id = ?7,
                metric_id = ?8,
                resolved_at = ?9,
                updated_at = ?10
             WHERE id = ?11;",
            params![
                issue.title.as_str(),
                issue.description.as_str(),
                issue.status.as_str(),
                issue.priority.as_str(),
                issue.solution.as_deref(),
                issue.assignee_id.map(|id| id.to_string()),
                issue.objective_id.map(|id| id.to_string()),
                issue.metric_id.map(|id| id.to_string()),
                issue.resolved_at,
                issue.updated_at,
                issue.id.to_string(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                table: "issues",
                id: issue.id,
            });
        }
        Ok(())
    }

    fn get_issue(&self, id: IssueId) -> RepoResult<Option<Issue>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ISSUE_SELECT_SQL} WHERE i.id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_issue_row(row)?));
        }
        Ok(None)
    }

    fn list_issues(&self, filter: &IssueFilter) -> RepoResult<Vec<Issue>> {
        let mut sql = format!("{ISSUE_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(actor_id) = filter.involving {
            sql.push_str(" AND (i.created_by = ? OR i.assignee_id = ?)");
            bind_values.push(Value::Text(actor_id.to_string()));
            bind_values.push(Value::Text(actor_id.to_string()));
        }
        if let Some(department_id) = filter.department_id {
            sql.push_str(" AND creator.department_id = ?");
            bind_values.push(Value::Text(department_id.to_string()));
        }
        if let Some(status) = filter.status {
            sql.push_str(" AND i.status = ?");
            bind_values.push(Value::Text(status.as_str().to_string()));
        }
        sql.push_str(" ORDER BY i.created_at DESC, i.rowid DESC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut issues = Vec::new();
        while let Some(row) = rows.next()? {
            issues.push(parse_issue_row(row)?);
        }
        Ok(issues)
    }

    fn delete_issue(&self, id: IssueId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM issues WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound { table: "issues", id });
        }
        Ok(())
    }
}

fn parse_issue_row(row: &Row<'_>) -> RepoResult<Issue> {
    let id_text: String = row.get("id")?;
    let status_text: String = row.get("status")?;
    let priority_text: String = row.get("priority")?;
    let created_by_text: String = row.get("created_by")?;

    let issue = Issue {
        id: parse_uuid(&id_text, "issues.id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        status: parse_label(&status_text, "issues.status", IssueStatus::parse)?,
        priority: parse_label(&priority_text, "issues.priority", IssuePriority::parse)?,
        solution: row.get("solution")?,
        created_by: parse_uuid(&created_by_text, "issues.created_by")?,
        assignee_id: parse_optional_uuid(row.get("assignee_id")?, "issues.assignee_id")?,
        objective_id: parse_optional_uuid(row.get("objective_id")?, "issues.objective_id")?,
        metric_id: parse_optional_uuid(row.get("metric_id")?, "issues.metric_id")?,
        resolved_at: row.get("resolved_at")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };
    issue.validate()?;
    Ok(issue)
}
