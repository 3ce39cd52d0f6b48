use serde::Serialize;
use sqlx::prelude::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WorkshopEntity {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub department: String,
    pub venue: Option<String>,
    pub held_on: chrono::NaiveDate,
    pub organized_by: Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
