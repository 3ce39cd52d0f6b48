use uuid::Uuid;

use crate::{
    api::error,
    modules::{
        audience::Viewer,
        notice::{
            model::NewNotice,
            schema::{NoticeEntity, NoticeKind},
        },
    },
};

#[async_trait::async_trait]
pub trait NoticeRepository {
    async fn create(&self, notice: &NewNotice) -> Result<NoticeEntity, error::SystemError>;

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<NoticeEntity>, error::SystemError>;

    /// Newest first, restricted to what `viewer` may see.
    async fn find_visible(
        &self,
        kind: NoticeKind,
        viewer: &Viewer,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<NoticeEntity>, error::SystemError>;

    async fn find_sent(
        &self,
        kind: NoticeKind,
        uploaded_by: &Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<NoticeEntity>, error::SystemError>;

    async fn delete(&self, id: &Uuid) -> Result<bool, error::SystemError>;
}
