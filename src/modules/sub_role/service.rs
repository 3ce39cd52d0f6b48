use log::info;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    api::error,
    modules::sub_role::{
        model::{CreateSubRoleModel, InsertSubRole},
        repository::SubRoleRepository,
        schema::SubRoleEntity,
    },
};

/// Department codes are stored trimmed and upper-cased.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

#[derive(Clone)]
pub struct SubRoleService {
    repo: Arc<dyn SubRoleRepository + Send + Sync>,
}

impl SubRoleService {
    pub fn with_dependencies(repo: Arc<dyn SubRoleRepository + Send + Sync>) -> Self {
        info!("SubRoleService initialized with dependencies");
        SubRoleService { repo }
    }

    pub async fn list(&self) -> Result<Vec<SubRoleEntity>, error::SystemError> {
        self.repo.list().await
    }

    pub async fn create(
        &self,
        model: CreateSubRoleModel,
    ) -> Result<SubRoleEntity, error::SystemError> {
        let mut allowed_roles = Vec::with_capacity(model.allowed_roles.len());
        for role in model.allowed_roles {
            if !allowed_roles.contains(&role) {
                allowed_roles.push(role);
            }
        }

        let insert = InsertSubRole {
            code: normalize_code(&model.code),
            name: model.name.trim().to_string(),
            allowed_roles,
        };
        let sub_role = self.repo.create(&insert).await?;
        info!("Sub-role {} created", sub_role.code);
        Ok(sub_role)
    }

    /// Looks a department up by code. Unknown codes are `None`, not an error.
    pub async fn resolve(&self, code: &str) -> Result<Option<SubRoleEntity>, error::SystemError> {
        self.repo.find_by_code(&normalize_code(code)).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), error::SystemError> {
        if !self.repo.delete(&id).await? {
            return Err(error::SystemError::not_found("Sub-role not found"));
        }
        info!("Sub-role {} deleted", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{modules::user::schema::UserRole, test::MemorySubRoles};

    fn service() -> SubRoleService {
        SubRoleService::with_dependencies(Arc::new(MemorySubRoles::default()))
    }

    #[tokio::test]
    async fn create_normalizes_code_and_resolves_case_insensitively() {
        let svc = service();
        let created = svc
            .create(CreateSubRoleModel {
                code: " cse ".into(),
                name: "Computer Science".into(),
                allowed_roles: vec![UserRole::Student, UserRole::Faculty, UserRole::Hod],
            })
            .await
            .unwrap();

        assert_eq!(created.code, "CSE");
        let resolved = svc.resolve("Cse").await.unwrap().unwrap();
        assert_eq!(resolved.id, created.id);
        assert!(resolved.allows(UserRole::Hod));
        assert!(!resolved.allows(UserRole::Dean));
    }

    #[tokio::test]
    async fn unknown_code_resolves_to_none() {
        assert!(service().resolve("NOPE").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn repeated_allowed_roles_are_stored_once() {
        let created = service()
            .create(CreateSubRoleModel {
                code: "IT".into(),
                name: "Information Technology".into(),
                allowed_roles: vec![UserRole::Student, UserRole::Faculty, UserRole::Student],
            })
            .await
            .unwrap();

        assert_eq!(created.allowed_roles, vec![UserRole::Student, UserRole::Faculty]);
    }

    #[tokio::test]
    async fn deleting_a_held_sub_role_is_a_conflict() {
        let repo = Arc::new(MemorySubRoles::default());
        let svc = SubRoleService::with_dependencies(repo.clone());
        let it = svc
            .create(CreateSubRoleModel {
                code: "IT".into(),
                name: "Information Technology".into(),
                allowed_roles: vec![UserRole::Student],
            })
            .await
            .unwrap();
        repo.hold(it.id);

        let err = svc.delete(it.id).await.unwrap_err();
        assert!(matches!(err, error::SystemError::Conflict(_)));
        let err: error::Error = err.into();
        assert!(matches!(&err, error::Error::Conflict(msg) if msg == "Still in use"));
        assert!(svc.resolve("IT").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn deleting_missing_sub_role_is_not_found() {
        let err = service().delete(Uuid::now_v7()).await.unwrap_err();
        assert!(matches!(err, error::SystemError::NotFound(_)));
    }
}
