//! Attachment metadata repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Only metadata is persisted; blobs live behind `location`.
//! - Listing order is newest first: `uploaded_at DESC, rowid DESC`.

use crate::db::migrations::ensure_latest;
use crate::model::actor::{ActorId, DepartmentId};
use crate::model::attachment::{Attachment, AttachmentId};
use crate::model::objective::ObjectiveId;
use crate::repo::{parse_uuid, RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const ATTACHMENT_SELECT_SQL: &str = "SELECT
    t.id AS id,
    t.file_name AS file_name,
    t.location AS location,
    t.size_bytes AS size_bytes,
    t.mime_type AS mime_type,
    t.description AS description,
    t.objective_id AS objective_id,
    t.uploader_id AS uploader_id,
    t.uploaded_at AS uploaded_at,
    t.updated_at AS updated_at
FROM attachments t
JOIN objectives o ON o.id = t.objective_id";

/// Filter for attachment listing. Empty filter lists everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttachmentFilter {
    pub objective_id: Option<ObjectiveId>,
    pub uploader_id: Option<ActorId>,
    /// Department of the owning objective.
    pub department_id: Option<DepartmentId>,
}

/// Repository interface for attachment metadata.
pub trait AttachmentRepository {
    fn create_attachment(&self, attachment: &Attachment) -> RepoResult<AttachmentId>;
    fn update_attachment(&self, attachment: &Attachment) -> RepoResult<()>;
    fn get_attachment(&self, id: AttachmentId) -> RepoResult<Option<Attachment>>;
    fn list_attachments(&self, filter: &AttachmentFilter) -> RepoResult<Vec<Attachment>>;
    fn delete_attachment(&self, id: AttachmentId) -> RepoResult<()>;
}

/// SQLite-backed attachment repository.
pub struct SqliteAttachmentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAttachmentRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_latest(conn)?;
        Ok(Self { conn })
    }
}

impl AttachmentRepository for SqliteAttachmentRepository<'_> {
    fn create_attachment(&self, attachment: &Attachment) -> RepoResult<AttachmentId> {
        attachment.validate()?;

        self.conn.execute(
            "INSERT INTO attachments (
                id,
                file_name,
                location,
                size_bytes,
                mime_type,
                description,
                objective_id,
                uploader_id,
                uploaded_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10);",
            params![
                attachment.id.to_string(),
                attachment.file_name.as_str(),
                attachment.location.as_str(),
                size_to_db(attachment.size_bytes)?,
                attachment.mime_type.as_deref(),
                attachment.description.as_deref(),
                attachment.objective_id.to_string(),
                attachment.uploader_id.to_string(),
                attachment.uploaded_at,
                attachment.updated_at,
            ],
        )?;
        Ok(attachment.id)
    }

    fn update_attachment(&self, attachment: &Attachment) -> RepoResult<()> {
        attachment.validate()?;

        let changed = self.conn.execute(
            "UPDATE attachments
             SET
                file_name = ?1,
                location = ?2,
                size_bytes = ?3,
                mime_type = ?4,
                description = ?5,
                updated_at = ?6
             WHERE id = ?7;",
            params![
                attachment.file_name.as_str(),
                attachment.location.as_str(),
                size_to_db(attachment.size_bytes)?,
                attachment.mime_type.as_deref(),
                attachment.description.as_deref(),
                attachment.updated_at,
                attachment.id.to_string(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                table: "attachments",
                id: attachment.id,
            });
        }
        Ok(())
    }

    fn get_attachment(&self, id: AttachmentId) -> RepoResult<Option<Attachment>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ATTACHMENT_SELECT_SQL} WHERE t.id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_attachment_row(row)?));
        }
        Ok(None)
    }

    fn list_attachments(&self, filter: &AttachmentFilter) -> RepoResult<Vec<Attachment>> {
        let mut sql = format!("{ATTACHMENT_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(objective_id) = filter.objective_id {
            sql.push_str(" AND t.objective_id = ?");
            bind_values.push(Value::Text(objective_id.to_string()));
        }
        if let Some(uploader_id) = filter.uploader_id {
            sql.push_str(" AND t.uploader_id = ?");
            bind_values.push(Value::Text(uploader_id.to_string()));
        }
        if let Some(department_id) = filter.department_id {
            sql.push_str(" AND o.department_id = ?");
            bind_values.push(Value::Text(department_id.to_string()));
        }
        sql.push_str(" ORDER BY t.uploaded_at DESC, t.rowid DESC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut attachments = Vec::new();
        while let Some(row) = rows.next()? {
            attachments.push(parse_attachment_row(row)?);
        }
        Ok(attachments)
    }

    fn delete_attachment(&self, id: AttachmentId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM attachments WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                table: "attachments",
                id,
            });
        }
        Ok(())
    }
}

fn size_to_db(size_bytes: Option<u64>) -> RepoResult<Option<i64>> {
    size_bytes
        .map(|size| {
            i64::try_from(size).map_err(|_| {
                RepoError::InvalidData(format!("attachment size {size} exceeds storage range"))
            })
        })
        .transpose()
}

fn parse_attachment_row(row: &Row<'_>) -> RepoResult<Attachment> {
    let id_text: String = row.get("id")?;
    let objective_text: String = row.get("objective_id")?;
    let uploader_text: String = row.get("uploader_id")?;
    let size_bytes = match row.get::<_, Option<i64>>("size_bytes")? {
        Some(size) => Some(u64::try_from(size).map_err(|_| {
            RepoError::InvalidData(format!(
                "invalid size_bytes value `{size}` in attachments.size_bytes"
            ))
        })?),
        None => None,
    };

    let attachment = Attachment {
        id: parse_uuid(&id_text, "attachments.id")?,
        file_name: row.get("file_name")?,
        location: row.get("location")?,
        size_bytes,
        mime_type: row.get("mime_type")?,
        description: row.get("description")?,
        objective_id: parse_uuid(&objective_text, "attachments.objective_id")?,
        uploader_id: parse_uuid(&uploader_text, "attachments.uploader_id")?,
        uploaded_at: row.get("uploaded_at")?,
        updated_at: row.get("updated_at")?,
    };
    attachment.validate()?;
    Ok(attachment)
}
