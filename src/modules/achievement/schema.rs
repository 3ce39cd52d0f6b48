use serde::{Deserialize, Serialize};
use sqlx::prelude::{FromRow, Type};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(type_name = "achievement_status")]
pub enum AchievementStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AchievementEntity {
    pub id: Uuid,
    pub student_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub department: String,
    pub file_id: Option<Uuid>,
    pub status: AchievementStatus,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<chrono::DateTime<chrono::Utc>>,
    pub remarks: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
