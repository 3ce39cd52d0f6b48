use serde::{Deserialize, Serialize};
use sqlx::prelude::{FromRow, Type};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(type_name = "drive_item_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DriveItemKind {
    Folder,
    File,
}

/// A node of a user's drive. `parent_id = None` is the root level.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DriveItemEntity {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub name: String,
    pub kind: DriveItemKind,
    pub file_id: Option<Uuid>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl DriveItemEntity {
    pub fn is_folder(&self) -> bool {
        self.kind == DriveItemKind::Folder
    }
}
