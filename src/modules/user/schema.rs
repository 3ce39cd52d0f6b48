use serde::{Deserialize, Serialize};
use sqlx::{
    postgres::{PgHasArrayType, PgTypeInfo},
    prelude::{FromRow, Type},
};
use uuid::Uuid;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Type, Serialize, Deserialize)]
#[sqlx(type_name = "user_role", no_pg_array)]
pub enum UserRole {
    Student,
    Faculty,
    #[sqlx(rename = "HOD")]
    #[serde(rename = "HOD")]
    Hod,
    #[sqlx(rename = "Asso.Dean")]
    #[serde(rename = "Asso.Dean")]
    AssoDean,
    Dean,
    Officers,
    Admin,
    SuperAdmin,
}

impl PgHasArrayType for UserRole {
    fn array_type_info() -> PgTypeInfo {
        PgTypeInfo::with_name("_user_role")
    }
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Student => "Student",
            UserRole::Faculty => "Faculty",
            UserRole::Hod => "HOD",
            UserRole::AssoDean => "Asso.Dean",
            UserRole::Dean => "Dean",
            UserRole::Officers => "Officers",
            UserRole::Admin => "Admin",
            UserRole::SuperAdmin => "SuperAdmin",
        }
    }

    pub fn is_student(&self) -> bool {
        matches!(self, UserRole::Student)
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin | UserRole::SuperAdmin)
    }

    /// HOD, the deans and the administrators.
    pub fn is_hod_or_above(&self) -> bool {
        matches!(
            self,
            UserRole::Hod | UserRole::AssoDean | UserRole::Dean | UserRole::Admin | UserRole::SuperAdmin
        )
    }

    /// Roles whose authority spans every department.
    pub fn is_institution_wide(&self) -> bool {
        matches!(self, UserRole::AssoDean | UserRole::Dean | UserRole::Admin | UserRole::SuperAdmin)
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct UserEntity {
    pub id: Uuid,
    pub username: String,
    pub hash_password: String,
    pub role: UserRole,
    pub sub_role_id: Option<Uuid>,
    /// Joined from `sub_roles.code`.
    pub sub_role_code: Option<String>,
    pub batch: Option<String>,
    pub can_upload_timetable: bool,
    pub can_approve_achievements: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
