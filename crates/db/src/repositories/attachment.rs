//! Attachment repository for database operations.
//!
//! Attachments record where a file was stored; the bytes themselves live
//! elsewhere. Adding one never depends on or changes the request status.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use tracing::{debug, info, warn};

use procura_core::extraction::{DocumentExtractor, ExtractedFields, FileHandle};
use procura_core::workflow::{Action, AuthorizationPolicy, WorkflowError};
use procura_shared::types::{AttachmentId, RequestId, UserId};

use super::convert::{db_err, load_actor, load_request, snapshot};
use crate::entities::attachments;

/// Input for recording an uploaded file.
#[derive(Debug, Clone)]
pub struct NewAttachment {
    /// Original file name.
    pub file_name: String,
    /// Opaque key under which the caller stored the file.
    pub storage_key: String,
    /// MIME type, if known.
    pub content_type: Option<String>,
}

/// An attachment plus whatever the extractor recovered from it.
#[derive(Debug, Clone)]
pub struct AttachmentUpload {
    /// The recorded attachment.
    pub attachment: attachments::Model,
    /// Extracted fields; `None` if extraction failed.
    pub extracted: Option<ExtractedFields>,
}

/// Attachment repository.
#[derive(Debug, Clone)]
pub struct AttachmentRepository {
    db: DatabaseConnection,
}

impl AttachmentRepository {
    /// Create a new attachment repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records a file uploaded for a request the uploader can see.
    ///
    /// # Errors
    ///
    /// - `Validation` for a blank file name or storage key
    /// - `RequestNotFound` / `UserNotFound`
    /// - `NotAuthorized` if the request is outside the uploader's scope
    pub async fn add(
        &self,
        uploaded_by: UserId,
        request_id: RequestId,
        input: NewAttachment,
    ) -> Result<attachments::Model, WorkflowError> {
        if input.file_name.trim().is_empty() {
            return Err(WorkflowError::validation("file_name is required"));
        }
        if input.storage_key.trim().is_empty() {
            return Err(WorkflowError::validation("storage_key is required"));
        }

        let request = load_request(&self.db, request_id).await?;
        let actor = load_actor(&self.db, uploaded_by).await?;
        AuthorizationPolicy::authorize(&actor, &snapshot(&request), Action::View)?;

        let attachment = attachments::ActiveModel {
            id: Set(AttachmentId::new().into_inner()),
            request_id: Set(request.id),
            file_name: Set(input.file_name),
            storage_key: Set(input.storage_key),
            content_type: Set(input.content_type),
            uploaded_by: Set(uploaded_by.into_inner()),
            uploaded_at: Set(Utc::now().into()),
        }
        .insert(&self.db)
        .await
        .map_err(db_err)?;

        info!(
            request_id = %request.id,
            attachment_id = %attachment.id,
            "attachment added"
        );
        Ok(attachment)
    }

    /// Attachments of a request, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_for_request(
        &self,
        request_id: RequestId,
    ) -> Result<Vec<attachments::Model>, WorkflowError> {
        attachments::Entity::find()
            .filter(attachments::Column::RequestId.eq(request_id.into_inner()))
            .order_by_asc(attachments::Column::UploadedAt)
            .all(&self.db)
            .await
            .map_err(db_err)
    }

    /// Like [`Self::add`], then runs `extractor` over the stored file.
    ///
    /// Extraction results are returned, never persisted. An extraction
    /// failure is logged and yields `extracted: None`; the attachment stays.
    ///
    /// # Errors
    ///
    /// Same as [`Self::add`].
    pub async fn add_with_extraction(
        &self,
        uploaded_by: UserId,
        request_id: RequestId,
        input: NewAttachment,
        extractor: &dyn DocumentExtractor,
    ) -> Result<AttachmentUpload, WorkflowError> {
        let attachment = self.add(uploaded_by, request_id, input).await?;

        let handle = FileHandle {
            file_name: attachment.file_name.clone(),
            storage_key: attachment.storage_key.clone(),
            content_type: attachment.content_type.clone(),
        };
        let extracted = match extractor.extract(&handle).await {
            Ok(fields) => {
                debug!(attachment_id = %attachment.id, empty = fields.is_empty(), "document extracted");
                Some(fields)
            }
            Err(e) => {
                warn!(attachment_id = %attachment.id, error = %e, "document extraction failed");
                None
            }
        };

        Ok(AttachmentUpload {
            attachment,
            extracted,
        })
    }
}
