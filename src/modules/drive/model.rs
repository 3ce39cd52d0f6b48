use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::{api::error, modules::drive::schema::DriveItemKind};

#[derive(Deserialize, Validate)]
pub struct CreateFolderModel {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters long"))]
    pub name: String,
    pub parent_id: Option<Uuid>,
}

#[derive(Deserialize, Validate)]
pub struct RenameModel {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters long"))]
    pub name: String,
}

/// Destination of a move or copy; `None` targets the root.
#[derive(Deserialize, Validate)]
pub struct DestinationModel {
    pub parent_id: Option<Uuid>,
}

#[derive(Deserialize, Validate)]
pub struct ListQuery {
    pub parent_id: Option<Uuid>,
}

#[derive(Deserialize, Validate)]
pub struct SearchQuery {
    #[validate(length(min = 1, max = 100, message = "Search text must be 1-100 characters long"))]
    pub q: String,
}

pub struct NewDriveItem {
    pub owner_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub name: String,
    pub kind: DriveItemKind,
    pub file_id: Option<Uuid>,
}

/// Trims a node name and rejects the ones a file tree cannot hold.
pub fn clean_name(name: &str) -> Result<String, error::SystemError> {
    let name = name.trim();
    if name.is_empty() || name == "." || name == ".." {
        return Err(error::SystemError::bad_request("Invalid name"));
    }
    if name.chars().any(|c| c == '/' || c == '\\' || c.is_control()) {
        return Err(error::SystemError::bad_request("Name cannot contain slashes or control characters"));
    }
    if name.chars().count() > 255 {
        return Err(error::SystemError::bad_request("Name is too long"));
    }
    Ok(name.to_string())
}
