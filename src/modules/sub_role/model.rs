use serde::Deserialize;
use validator::Validate;

use crate::modules::user::schema::UserRole;

#[derive(Deserialize, Validate)]
pub struct CreateSubRoleModel {
    #[validate(length(min = 1, max = 32, message = "Code must be 1-32 characters long"))]
    pub code: String,
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: String,
    #[validate(length(min = 1, message = "At least one role must be allowed"))]
    pub allowed_roles: Vec<UserRole>,
}

pub struct InsertSubRole {
    pub code: String,
    pub name: String,
    pub allowed_roles: Vec<UserRole>,
}
