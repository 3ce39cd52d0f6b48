use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
    api::error,
    modules::achievement::schema::AchievementStatus,
    utils::{MultipartForm, UploadedFile},
};

#[derive(Debug)]
pub struct AchievementDraft {
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub proof: Option<UploadedFile>,
}

impl AchievementDraft {
    pub fn from_form(mut form: MultipartForm) -> Result<Self, error::Error> {
        let title = form.require("title")?.to_string();
        let category = form.text("category").unwrap_or("General").to_string();
        let description = form.text("description").map(str::to_string);

        Ok(AchievementDraft { title, description, category, proof: form.take_file() })
    }
}

#[derive(Deserialize, Validate)]
pub struct AchievementQuery {
    pub department: Option<String>,
    pub status: Option<AchievementStatus>,
    #[validate(range(min = 1, max = 200))]
    pub limit: Option<i64>,
    #[validate(range(min = 0))]
    pub offset: Option<i64>,
}

#[derive(Deserialize, Validate, Default)]
pub struct ReviewModel {
    #[validate(length(max = 1000, message = "Remarks must be at most 1000 characters long"))]
    pub remarks: Option<String>,
}

pub struct NewAchievement {
    pub student_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub department: String,
    pub file_id: Option<Uuid>,
}

pub struct Review {
    pub status: AchievementStatus,
    pub reviewed_by: Uuid,
    pub remarks: Option<String>,
}
