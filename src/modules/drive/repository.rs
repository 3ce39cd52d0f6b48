use uuid::Uuid;

use crate::{
    api::error,
    modules::drive::{model::NewDriveItem, schema::DriveItemEntity},
};

#[async_trait::async_trait]
pub trait DriveRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<DriveItemEntity>, error::SystemError>;

    /// Exact-name lookup among the children of `parent_id`.
    async fn find_sibling(
        &self,
        owner_id: &Uuid,
        parent_id: Option<Uuid>,
        name: &str,
    ) -> Result<Option<DriveItemEntity>, error::SystemError>;

    async fn list_children(
        &self,
        owner_id: &Uuid,
        parent_id: Option<Uuid>,
    ) -> Result<Vec<DriveItemEntity>, error::SystemError>;

    async fn create(&self, item: &NewDriveItem) -> Result<DriveItemEntity, error::SystemError>;

    async fn rename(&self, id: &Uuid, name: &str) -> Result<DriveItemEntity, error::SystemError>;

    async fn set_parent(
        &self,
        id: &Uuid,
        parent_id: Option<Uuid>,
    ) -> Result<DriveItemEntity, error::SystemError>;

    async fn delete(&self, id: &Uuid) -> Result<(), error::SystemError>;

    /// Case-insensitive substring match over every node of the owner.
    async fn search(
        &self,
        owner_id: &Uuid,
        query: &str,
        limit: i64,
    ) -> Result<Vec<DriveItemEntity>, error::SystemError>;
}
