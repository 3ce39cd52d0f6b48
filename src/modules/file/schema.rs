use serde::{Deserialize, Serialize};
use sqlx::prelude::{FromRow, Type};
use uuid::Uuid;

/// Which kind of record owns a stored blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(type_name = "file_usage", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum FileUsage {
    Personal,
    Announcement,
    Achievement,
    DeptDocument,
}

/// File metadata entity from database. One row is exactly one blob.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FileEntity {
    pub id: Uuid,
    #[serde(skip_serializing)]
    pub storage_key: String,
    pub original_name: String,
    pub mime_type: String,
    pub size: i64,
    pub uploaded_by: Uuid,
    pub usage: FileUsage,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
