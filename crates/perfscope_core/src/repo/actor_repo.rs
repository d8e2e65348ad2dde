//! Actor and department repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Roles are stored as canonical labels; reads accept any spelling that
//!   `parse_role_label` understands, so seeded titles such as
//!   `"Department Head"` load correctly.
//! - Listing order is insertion order (`rowid`).

use crate::db::migrations::ensure_latest;
use crate::model::actor::{Actor, ActorId, Department, DepartmentId};
use crate::model::role::parse_role_label;
use crate::repo::{parse_optional_uuid, parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};

const ACTOR_SELECT_SQL: &str = "SELECT
    a.id AS id,
    a.name AS name,
    a.email AS email,
    a.role AS role,
    a.designation AS designation,
    a.department_id AS department_id
FROM actors a";

/// Repository interface for actors and departments.
pub trait ActorRepository {
    fn create_department(&self, department: &Department) -> RepoResult<DepartmentId>;
    fn get_department(&self, id: DepartmentId) -> RepoResult<Option<Department>>;
    fn create_actor(&self, actor: &Actor) -> RepoResult<ActorId>;
    fn update_actor(&self, actor: &Actor) -> RepoResult<()>;
    fn get_actor(&self, id: ActorId) -> RepoResult<Option<Actor>>;
    fn list_actors(&self) -> RepoResult<Vec<Actor>>;
    /// Actors assigned at least one objective, in insertion order.
    fn list_objective_owners(&self) -> RepoResult<Vec<Actor>>;
}

/// SQLite-backed actor repository.
pub struct SqliteActorRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteActorRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_latest(conn)?;
        Ok(Self { conn })
    }
}

impl ActorRepository for SqliteActorRepository<'_> {
    fn create_department(&self, department: &Department) -> RepoResult<DepartmentId> {
        self.conn.execute(
            "INSERT INTO departments (id, name, code) VALUES (?1, ?2, ?3);",
            params![
                department.id.to_string(),
                department.name.as_str(),
                department.code.as_str(),
            ],
        )?;
        Ok(department.id)
    }

    fn get_department(&self, id: DepartmentId) -> RepoResult<Option<Department>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, name, code FROM departments WHERE id = ?1;",
                [id.to_string()],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            )
            .optional()?;

        row.map(|(id_text, name, code)| {
            Ok(Department {
                id: parse_uuid(&id_text, "departments.id")?,
                name,
                code,
            })
        })
        .transpose()
    }

    fn create_actor(&self, actor: &Actor) -> RepoResult<ActorId> {
        self.conn.execute(
            "INSERT INTO actors (id, name, email, role, designation, department_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                actor.id.to_string(),
                actor.name.as_str(),
                actor.email.as_str(),
                actor.role.as_str(),
                actor.designation.as_deref(),
                actor.department_id.map(|id| id.to_string()),
            ],
        )?;
        Ok(actor.id)
    }

    fn update_actor(&self, actor: &Actor) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE actors
             SET name = ?1, email = ?2, role = ?3, designation = ?4, department_id = ?5
             WHERE id = ?6;",
            params![
                actor.name.as_str(),
                actor.email.as_str(),
                actor.role.as_str(),
                actor.designation.as_deref(),
                actor.department_id.map(|id| id.to_string()),
                actor.id.to_string(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                table: "actors",
                id: actor.id,
            });
        }
        Ok(())
    }

    fn get_actor(&self, id: ActorId) -> RepoResult<Option<Actor>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ACTOR_SELECT_SQL} WHERE a.id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_actor_row(row)?));
        }
        Ok(None)
    }

    fn list_actors(&self) -> RepoResult<Vec<Actor>> {
        collect_actors(
            self.conn,
            &format!("{ACTOR_SELECT_SQL} ORDER BY a.rowid ASC;"),
        )
    }

    fn list_objective_owners(&self) -> RepoResult<Vec<Actor>> {
        collect_actors(
            self.conn,
            &format!(
                "{ACTOR_SELECT_SQL}
                 WHERE EXISTS (SELECT 1 FROM objectives o WHERE o.assignee_id = a.id)
                 ORDER BY a.rowid ASC;"
            ),
        )
    }
}

fn collect_actors(conn: &Connection, sql: &str) -> RepoResult<Vec<Actor>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query([])?;
    let mut actors = Vec::new();
    while let Some(row) = rows.next()? {
        actors.push(parse_actor_row(row)?);
    }
    Ok(actors)
}

fn parse_actor_row(row: &Row<'_>) -> RepoResult<Actor> {
    let id_text: String = row.get("id")?;
    let role_text: String = row.get("role")?;
    let role = parse_role_label(&role_text).map_err(|err| {
        RepoError::InvalidData(format!("{err} in actors.role for actor {id_text}"))
    })?;

    Ok(Actor {
        id: parse_uuid(&id_text, "actors.id")?,
        name: row.get("name")?,
        email: row.get("email")?,
        role,
        designation: row.get("designation")?,
        department_id: parse_optional_uuid(row.get("department_id")?, "actors.department_id")?,
    })
}
