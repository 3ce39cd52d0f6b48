use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

#[derive(Deserialize, Validate)]
pub struct CreateWorkshopModel {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters long"))]
    pub title: String,
    pub description: Option<String>,
    /// Defaults to the organizer's own department.
    pub department: Option<String>,
    pub venue: Option<String>,
    pub held_on: chrono::NaiveDate,
}

#[derive(Deserialize, Validate)]
pub struct WorkshopQuery {
    pub department: Option<String>,
}

pub struct NewWorkshop {
    pub title: String,
    pub description: Option<String>,
    pub department: String,
    pub venue: Option<String>,
    pub held_on: chrono::NaiveDate,
    pub organized_by: Uuid,
}
