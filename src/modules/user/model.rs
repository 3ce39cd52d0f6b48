use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::modules::{
    audience::Viewer,
    user::schema::{UserEntity, UserRole},
};

/// Student self-registration.
#[derive(Deserialize, Validate)]
pub struct SignUpModel {
    #[validate(length(min = 3, message = "Username must be at least 3 characters long"))]
    pub username: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: String,
    #[validate(length(min = 1, message = "Department cannot be empty"))]
    pub sub_role: String,
    #[validate(length(min = 1, message = "Batch cannot be empty"))]
    pub batch: String,
}

#[derive(Deserialize, Validate)]
pub struct SignInModel {
    #[validate(length(min = 3, message = "Username must be at least 3 characters long"))]
    pub username: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: String,
}

/// Account creation by an administrator.
#[derive(Deserialize, Validate)]
pub struct CreateUserModel {
    #[validate(length(min = 3, message = "Username must be at least 3 characters long"))]
    pub username: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: String,
    pub role: UserRole,
    pub sub_role: Option<String>,
    pub batch: Option<String>,
    #[serde(default)]
    pub can_upload_timetable: bool,
    #[serde(default)]
    pub can_approve_achievements: bool,
}

#[derive(Deserialize, Validate)]
pub struct ChangePasswordModel {
    #[validate(length(min = 1, message = "Current password cannot be empty"))]
    pub current_password: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub new_password: String,
}

#[derive(Deserialize, Validate)]
pub struct UpdatePermissionsModel {
    pub can_upload_timetable: Option<bool>,
    pub can_approve_achievements: Option<bool>,
}

#[derive(Deserialize, Validate)]
pub struct UserQuery {
    pub role: Option<UserRole>,
    pub sub_role: Option<String>,
    #[validate(range(min = 1, max = 200))]
    pub limit: Option<i64>,
    #[validate(range(min = 0))]
    pub offset: Option<i64>,
}

pub struct InsertUser {
    pub username: String,
    pub hash_password: String,
    pub role: UserRole,
    pub sub_role_id: Option<Uuid>,
    pub batch: Option<String>,
    pub can_upload_timetable: bool,
    pub can_approve_achievements: bool,
}

pub struct UpdatePermissions {
    pub can_upload_timetable: Option<bool>,
    pub can_approve_achievements: Option<bool>,
}

#[derive(Serialize)]
pub struct SignUpResponse {
    pub id: Uuid,
}

#[derive(Serialize)]
pub struct SignInResponse {
    pub access_token: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub role: UserRole,
    pub sub_role: Option<String>,
    pub batch: Option<String>,
    pub can_upload_timetable: bool,
    pub can_approve_achievements: bool,
}

impl UserResponse {
    pub fn viewer(&self) -> Viewer {
        Viewer {
            id: self.id,
            role: self.role,
            sub_role: self.sub_role.clone(),
            batch: if self.role.is_student() { self.batch.clone() } else { None },
        }
    }

    /// True when this user's authority covers `department`.
    pub fn governs(&self, department: &str) -> bool {
        self.role.is_institution_wide() || self.sub_role.as_deref() == Some(department)
    }
}

impl From<UserEntity> for UserResponse {
    fn from(entity: UserEntity) -> Self {
        UserResponse {
            id: entity.id,
            username: entity.username,
            role: entity.role,
            sub_role: entity.sub_role_code,
            batch: entity.batch,
            can_upload_timetable: entity.can_upload_timetable,
            can_approve_achievements: entity.can_approve_achievements,
        }
    }
}
