//! Attachment ("upload") metadata record.
//!
//! Only metadata lives here; the blob itself is addressed by `location`.

use crate::model::actor::ActorId;
use crate::model::now_epoch_ms;
use crate::model::objective::ObjectiveId;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable attachment identifier.
pub type AttachmentId = Uuid;

static MIME_TYPE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9!#$&^_.+-]*/[A-Za-z0-9][A-Za-z0-9!#$&^_.+-]*$")
        .expect("mime type regex must compile")
});

/// File metadata attached to one objective.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: AttachmentId,
    pub file_name: String,
    /// Blob store reference (URL or key).
    pub location: String,
    pub size_bytes: Option<u64>,
    pub mime_type: Option<String>,
    pub description: Option<String>,
    pub objective_id: ObjectiveId,
    pub uploader_id: ActorId,
    pub uploaded_at: i64,
    pub updated_at: i64,
}

impl Attachment {
    pub fn new(
        objective_id: ObjectiveId,
        uploader_id: ActorId,
        file_name: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        let now = now_epoch_ms();
        Self {
            id: Uuid::new_v4(),
            file_name: file_name.into(),
            location: location.into(),
            size_bytes: None,
            mime_type: None,
            description: None,
            objective_id,
            uploader_id,
            uploaded_at: now,
            updated_at: now,
        }
    }

    pub fn validate(&self) -> Result<(), AttachmentValidationError> {
        if self.file_name.trim().is_empty() {
            return Err(AttachmentValidationError::BlankFileName);
        }
        if self.location.trim().is_empty() {
            return Err(AttachmentValidationError::BlankLocation);
        }
        if let Some(mime_type) = self.mime_type.as_deref() {
            if !MIME_TYPE_RE.is_match(mime_type) {
                return Err(AttachmentValidationError::InvalidMimeType(
                    mime_type.to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Attachment validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachmentValidationError {
    BlankFileName,
    BlankLocation,
    InvalidMimeType(String),
}

impl Display for AttachmentValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankFileName => write!(f, "attachment file name must not be blank"),
            Self::BlankLocation => write!(f, "attachment location must not be blank"),
            Self::InvalidMimeType(value) => write!(f, "attachment mime type is invalid: {value}"),
        }
    }
}

impl Error for AttachmentValidationError {}
