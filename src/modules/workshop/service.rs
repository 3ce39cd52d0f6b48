use log::info;
use std::sync::Arc;
use uuid::Uuid;

use crate::api::error;
use crate::modules::{
    sub_role::service::SubRoleService,
    user::{model::UserResponse, schema::UserRole},
    workshop::{
        model::{CreateWorkshopModel, NewWorkshop},
        repository::WorkshopRepository,
        schema::WorkshopEntity,
    },
};

#[derive(Clone)]
pub struct WorkshopService {
    repo: Arc<dyn WorkshopRepository + Send + Sync>,
    sub_roles: SubRoleService,
}

impl WorkshopService {
    pub fn with_dependencies(
        repo: Arc<dyn WorkshopRepository + Send + Sync>,
        sub_roles: SubRoleService,
    ) -> Self {
        info!("WorkshopService initialized with dependencies");
        WorkshopService { repo, sub_roles }
    }

    pub async fn create(
        &self,
        organizer: &UserResponse,
        model: CreateWorkshopModel,
    ) -> Result<WorkshopEntity, error::SystemError> {
        if organizer.role.is_student() {
            return Err(error::SystemError::forbidden("Students cannot record workshops"));
        }

        let code = model
            .department
            .as_deref()
            .or(organizer.sub_role.as_deref())
            .ok_or_else(|| error::SystemError::bad_request("A department is required"))?;
        let department = self
            .sub_roles
            .resolve(code)
            .await?
            .ok_or_else(|| error::SystemError::bad_request(format!("Unknown department '{code}'")))?;

        let workshop = self
            .repo
            .create(&NewWorkshop {
                title: model.title.trim().to_string(),
                description: model.description,
                department: department.code,
                venue: model.venue,
                held_on: model.held_on,
                organized_by: organizer.id,
            })
            .await?;
        info!("Workshop {} recorded by {}", workshop.id, organizer.id);
        Ok(workshop)
    }

    /// All workshops, or one department's. An unknown department code lists nothing.
    pub async fn list(&self, department: Option<&str>) -> Result<Vec<WorkshopEntity>, error::SystemError> {
        match department.map(str::trim).filter(|d| !d.is_empty()) {
            Some(code) => match self.sub_roles.resolve(code).await? {
                Some(sub_role) => self.repo.list(Some(&sub_role.code)).await,
                None => Ok(Vec::new()),
            },
            None => self.repo.list(None).await,
        }
    }

    pub async fn mine(&self, organizer: &Uuid) -> Result<Vec<WorkshopEntity>, error::SystemError> {
        self.repo.find_by_organizer(organizer).await
    }

    pub async fn delete(&self, actor: &UserResponse, id: Uuid) -> Result<(), error::SystemError> {
        let workshop = self
            .repo
            .find_by_id(&id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Workshop not found"))?;

        let manager = matches!(actor.role, UserRole::Hod | UserRole::Admin | UserRole::SuperAdmin);
        if actor.id != workshop.organized_by && !manager {
            return Err(error::SystemError::forbidden("Only the organizer can delete this workshop"));
        }

        self.repo.delete(&id).await?;
        info!("Workshop {} deleted by {}", id, actor.id);
        Ok(())
    }
}
