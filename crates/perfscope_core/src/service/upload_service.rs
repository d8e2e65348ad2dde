//! Attachment metadata service guarded by objective ownership.

use crate::access::upload_guard::{authorize_upload, UploadOperation};
use crate::error::{ResourceKind, ServiceError, ServiceResult};
use crate::model::actor::Actor;
use crate::model::attachment::{Attachment, AttachmentId};
use crate::model::now_epoch_ms;
use crate::model::objective::ObjectiveId;
use crate::repo::attachment_repo::AttachmentFilter;
use crate::repo::RecordStore;
use crate::service::{load_objective, require_manager};
use log::info;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewUpload {
    pub file_name: String,
    pub location: String,
    pub size_bytes: Option<u64>,
    pub mime_type: Option<String>,
    pub description: Option<String>,
}

pub struct UploadService<S: RecordStore> {
    store: S,
}

impl<S: RecordStore> UploadService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn create_upload(
        &self,
        actor: &Actor,
        objective_id: ObjectiveId,
        input: NewUpload,
    ) -> ServiceResult<Attachment> {
        let objective = load_objective(&self.store, objective_id)?;
        authorize_upload(actor, &objective, UploadOperation::Create, None)?;

        let mut attachment = Attachment::new(
            objective.id,
            actor.id,
            input.file_name.trim(),
            input.location.trim(),
        );
        attachment.size_bytes = input.size_bytes;
        attachment.mime_type = input.mime_type;
        attachment.description = input.description;

        self.store.attachments().create_attachment(&attachment)?;
        info!(
            "event=upload_create module=uploads status=ok actor_id={} objective_id={} attachment_id={}",
            actor.id, objective.id, attachment.id
        );
        Ok(attachment)
    }

    /// Attachments of one objective, newest first.
    pub fn list_uploads(
        &self,
        actor: &Actor,
        objective_id: ObjectiveId,
    ) -> ServiceResult<Vec<Attachment>> {
        let objective = load_objective(&self.store, objective_id)?;
        authorize_upload(actor, &objective, UploadOperation::Read, None)?;
        Ok(self.store.attachments().list_attachments(&AttachmentFilter {
            objective_id: Some(objective_id),
            ..AttachmentFilter::default()
        })?)
    }

    pub fn list_my_uploads(&self, actor: &Actor) -> ServiceResult<Vec<Attachment>> {
        Ok(self.store.attachments().list_attachments(&AttachmentFilter {
            uploader_id: Some(actor.id),
            ..AttachmentFilter::default()
        })?)
    }

    /// Attachments on objectives of the actor's department.
    ///
    /// A manager-class actor without a department sees every attachment.
    pub fn list_department_uploads(&self, actor: &Actor) -> ServiceResult<Vec<Attachment>> {
        require_manager(actor, "list department uploads")?;
        Ok(self.store.attachments().list_attachments(&AttachmentFilter {
            department_id: actor.department_id,
            ..AttachmentFilter::default()
        })?)
    }

    pub fn get_upload(&self, actor: &Actor, id: AttachmentId) -> ServiceResult<Attachment> {
        let attachment = self.load(id)?;
        let objective = load_objective(&self.store, attachment.objective_id)?;
        authorize_upload(actor, &objective, UploadOperation::Read, Some(&attachment))?;
        Ok(attachment)
    }

    /// Replaces the description; file identity is immutable.
    pub fn update_upload(
        &self,
        actor: &Actor,
        id: AttachmentId,
        description: Option<String>,
    ) -> ServiceResult<Attachment> {
        let mut attachment = self.load(id)?;
        let objective = load_objective(&self.store, attachment.objective_id)?;
        authorize_upload(actor, &objective, UploadOperation::Update, Some(&attachment))?;

        attachment.description = description;
        attachment.updated_at = now_epoch_ms();
        self.store.attachments().update_attachment(&attachment)?;
        info!(
            "event=upload_update module=uploads status=ok actor_id={} attachment_id={}",
            actor.id, attachment.id
        );
        Ok(attachment)
    }

    pub fn delete_upload(&self, actor: &Actor, id: AttachmentId) -> ServiceResult<()> {
        let attachment = self.load(id)?;
        let objective = load_objective(&self.store, attachment.objective_id)?;
        authorize_upload(actor, &objective, UploadOperation::Delete, Some(&attachment))?;

        self.store.attachments().delete_attachment(id)?;
        info!(
            "event=upload_delete module=uploads status=ok actor_id={} attachment_id={}",
            actor.id, id
        );
        Ok(())
    }

    fn load(&self, id: AttachmentId) -> ServiceResult<Attachment> {
        self.store
            .attachments()
            .get_attachment(id)?
            .ok_or_else(|| ServiceError::not_found(ResourceKind::Attachment, id))
    }
}
