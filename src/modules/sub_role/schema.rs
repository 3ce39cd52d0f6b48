use serde::Serialize;
use sqlx::prelude::FromRow;
use uuid::Uuid;

use crate::modules::user::schema::UserRole;

/// A department or office a user can belong to (CSE, IQAC, ...).
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SubRoleEntity {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub allowed_roles: Vec<UserRole>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl SubRoleEntity {
    pub fn allows(&self, role: UserRole) -> bool {
        self.allowed_roles.contains(&role)
    }
}
