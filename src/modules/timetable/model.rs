use uuid::Uuid;

use crate::{
    api::error,
    modules::audience::{Audience, TargetRule},
    utils::{MultipartForm, UploadedFile},
};

#[derive(Debug)]
pub struct TimetableDraft {
    pub title: String,
    pub department: String,
    pub batch: Option<String>,
    /// `None` falls back to every role of the department.
    pub rules: Option<Vec<TargetRule>>,
    pub individuals: Vec<Uuid>,
    pub file: UploadedFile,
}

impl TimetableDraft {
    pub fn from_form(mut form: MultipartForm) -> Result<Self, error::Error> {
        let title = form.require("title")?.to_string();
        let department = form.require("department")?.to_string();
        let batch = form.text("batch").filter(|b| !b.eq_ignore_ascii_case("all")).map(str::to_string);
        let rules: Option<Vec<TargetRule>> = form.json("audience")?;
        let individuals = form.json("individuals")?.unwrap_or_default();
        let file = form
            .take_file()
            .ok_or_else(|| error::Error::bad_request("A timetable needs an attached file"))?;

        Ok(TimetableDraft {
            title,
            department,
            batch,
            rules: rules.filter(|r| !r.is_empty()),
            individuals,
            file,
        })
    }
}

/// Row values written on create and on replace.
pub struct TimetableValues {
    pub title: String,
    pub department: String,
    pub batch: Option<String>,
    pub file_id: Uuid,
    pub uploaded_by: Uuid,
    pub audience: Audience,
}
