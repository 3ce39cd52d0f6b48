use log::{info, warn};
use std::sync::Arc;
use uuid::Uuid;

use crate::api::{error, success::Download};
use crate::modules::{
    audience::{Audience, Viewer},
    file::service::FileService,
    notice::{
        model::{NewNotice, NoticeDraft},
        repository::NoticeRepository,
        schema::{NoticeEntity, NoticeKind},
    },
    user::{model::UserResponse, schema::UserRole},
};

/// Uploader, or HOD and the administrators.
fn can_delete(actor: &UserResponse, uploaded_by: Uuid) -> bool {
    actor.id == uploaded_by
        || matches!(actor.role, UserRole::Hod | UserRole::Admin | UserRole::SuperAdmin)
}

#[derive(Clone)]
pub struct NoticeService {
    repo: Arc<dyn NoticeRepository + Send + Sync>,
    files: FileService,
}

impl NoticeService {
    pub fn with_dependencies(
        repo: Arc<dyn NoticeRepository + Send + Sync>,
        files: FileService,
    ) -> Self {
        info!("NoticeService initialized with dependencies");
        NoticeService { repo, files }
    }

    pub async fn publish(
        &self,
        kind: NoticeKind,
        author: &UserResponse,
        draft: NoticeDraft,
    ) -> Result<NoticeEntity, error::SystemError> {
        if !kind.can_publish(author.role) {
            return Err(error::SystemError::forbidden(format!(
                "{} cannot publish a {}",
                author.role.as_str(),
                kind.label()
            )));
        }
        if kind.requires_file() && draft.attachment.is_none() {
            return Err(error::SystemError::bad_request(format!(
                "A {} needs an attached file",
                kind.label()
            )));
        }
        let audience = Audience::new(draft.rules, draft.individuals)?;

        let file = match draft.attachment {
            Some(upload) => Some(self.files.store(upload, author.id, kind.file_usage()).await?),
            None => None,
        };
        let file_id = file.as_ref().map(|f| f.id);

        let created = self
            .repo
            .create(&NewNotice {
                kind,
                title: draft.title,
                body: draft.body,
                uploaded_by: author.id,
                audience,
                file_id,
            })
            .await;

        match created {
            Ok(notice) => {
                info!("{} {} published by {}", kind.label(), notice.id, author.id);
                Ok(notice)
            }
            Err(e) => {
                if let Some(file_id) = file_id {
                    self.files.remove(&file_id).await?;
                }
                Err(e)
            }
        }
    }

    pub async fn visible(
        &self,
        kind: NoticeKind,
        viewer: &Viewer,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<NoticeEntity>, error::SystemError> {
        self.repo.find_visible(kind, viewer, limit, offset).await
    }

    pub async fn sent(
        &self,
        kind: NoticeKind,
        author_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<NoticeEntity>, error::SystemError> {
        self.repo.find_sent(kind, &author_id, limit, offset).await
    }

    /// Hidden notices look exactly like missing ones.
    pub async fn get(
        &self,
        kind: NoticeKind,
        id: Uuid,
        viewer: &Viewer,
    ) -> Result<NoticeEntity, error::SystemError> {
        self.repo
            .find_by_id(&id)
            .await?
            .filter(|n| n.kind == kind && n.audience().is_visible_to(viewer, n.uploaded_by))
            .ok_or_else(|| error::SystemError::not_found(format!("{} not found", kind.label())))
    }

    pub async fn attachment(
        &self,
        kind: NoticeKind,
        id: Uuid,
        viewer: &Viewer,
    ) -> Result<Download, error::SystemError> {
        let notice = self.get(kind, id, viewer).await?;
        let file_id = notice
            .file_id
            .ok_or_else(|| error::SystemError::not_found("This notice has no attachment"))?;
        self.files.download(&file_id, None).await
    }

    pub async fn delete(
        &self,
        kind: NoticeKind,
        id: Uuid,
        actor: &UserResponse,
    ) -> Result<(), error::SystemError> {
        let notice = self
            .repo
            .find_by_id(&id)
            .await?
            .filter(|n| n.kind == kind)
            .ok_or_else(|| error::SystemError::not_found(format!("{} not found", kind.label())))?;

        if !can_delete(actor, notice.uploaded_by) {
            return Err(error::SystemError::forbidden("Only the uploader can delete this"));
        }

        if !self.repo.delete(&id).await? {
            warn!("{} {} vanished before delete", kind.label(), id);
        }
        if let Some(file_id) = notice.file_id {
            self.files.remove(&file_id).await?;
        }
        info!("{} {} deleted by {}", kind.label(), id, actor.id);
        Ok(())
    }
}
