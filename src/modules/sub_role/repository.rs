use uuid::Uuid;

use crate::{
    api::error,
    modules::sub_role::{model::InsertSubRole, schema::SubRoleEntity},
};

#[async_trait::async_trait]
pub trait SubRoleRepository {
    async fn find_by_code(&self, code: &str) -> Result<Option<SubRoleEntity>, error::SystemError>;
    async fn list(&self) -> Result<Vec<SubRoleEntity>, error::SystemError>;
    async fn create(&self, sub_role: &InsertSubRole) -> Result<SubRoleEntity, error::SystemError>;
    async fn delete(&self, id: &Uuid) -> Result<bool, error::SystemError>;
}
