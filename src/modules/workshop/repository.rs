use uuid::Uuid;

use crate::{
    api::error,
    modules::workshop::{model::NewWorkshop, schema::WorkshopEntity},
};

#[async_trait::async_trait]
pub trait WorkshopRepository {
    async fn create(&self, workshop: &NewWorkshop) -> Result<WorkshopEntity, error::SystemError>;
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<WorkshopEntity>, error::SystemError>;
    async fn list(&self, department: Option<&str>) -> Result<Vec<WorkshopEntity>, error::SystemError>;
    async fn find_by_organizer(&self, organizer: &Uuid) -> Result<Vec<WorkshopEntity>, error::SystemError>;
    async fn delete(&self, id: &Uuid) -> Result<bool, error::SystemError>;
}
