use uuid::Uuid;

use crate::{
    api::error,
    modules::user::{
        model::{InsertUser, UpdatePermissions},
        schema::{UserEntity, UserRole},
    },
};

#[async_trait::async_trait]
pub trait UserRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<UserEntity>, error::SystemError>;
    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserEntity>, error::SystemError>;
    async fn create(&self, user: &InsertUser) -> Result<Uuid, error::SystemError>;
    async fn update_password(&self, id: &Uuid, hash_password: &str)
        -> Result<(), error::SystemError>;
    async fn update_permissions(
        &self,
        id: &Uuid,
        permissions: &UpdatePermissions,
    ) -> Result<UserEntity, error::SystemError>;

    /// Filtered listing; `sub_role` is a department code.
    async fn list(
        &self,
        role: Option<UserRole>,
        sub_role: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<UserEntity>, error::SystemError>;
}
