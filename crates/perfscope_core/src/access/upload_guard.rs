//! Upload ownership guard.
//!
//! Every attachment operation is checked against the owning objective that
//! the caller reloaded for this request. Mutations never trust a cached
//! objective.

use crate::model::actor::{Actor, ActorId};
use crate::model::attachment::Attachment;
use crate::model::objective::{Objective, ObjectiveId};
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadOperation {
    Create,
    Read,
    Update,
    Delete,
}

impl UploadOperation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }

    pub fn is_write(self) -> bool {
        !matches!(self, Self::Read)
    }
}

/// Rejected attachment access, naming the relationship that was missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadDenied {
    pub actor_id: ActorId,
    pub objective_id: ObjectiveId,
    pub operation: UploadOperation,
}

impl Display for UploadDenied {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.operation {
            UploadOperation::Read => write!(
                f,
                "actor {} may not read attachments of objective {}: not its assignee, \
                 not the uploader and not manager-class",
                self.actor_id, self.objective_id
            ),
            operation => write!(
                f,
                "actor {} may not {} attachments of objective {}: not its assignee \
                 and not manager-class",
                self.actor_id,
                operation.as_str(),
                self.objective_id
            ),
        }
    }
}

impl Error for UploadDenied {}

/// Checks one attachment operation against the owning objective.
///
/// Writes require the objective's assignee or a manager-class actor. Reads
/// additionally admit the uploader of `attachment` when one is given, which
/// covers single-record reads after the objective changed hands.
pub fn authorize_upload(
    actor: &Actor,
    objective: &Objective,
    operation: UploadOperation,
    attachment: Option<&Attachment>,
) -> Result<(), UploadDenied> {
    if actor.can_act_as_manager() || objective.assignee_id == actor.id {
        return Ok(());
    }

    let is_uploader = attachment.is_some_and(|item| item.uploader_id == actor.id);
    if operation == UploadOperation::Read && is_uploader {
        return Ok(());
    }

    Err(UploadDenied {
        actor_id: actor.id,
        objective_id: objective.id,
        operation,
    })
}
