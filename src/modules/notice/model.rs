use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
    api::error,
    constants::DEFAULT_PAGE_SIZE,
    modules::{
        audience::{Audience, TargetRule},
        notice::schema::NoticeKind,
    },
    utils::{MultipartForm, UploadedFile},
};

#[derive(Deserialize, Validate)]
pub struct NoticeQuery {
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<i64>,
    #[validate(range(min = 0))]
    pub offset: Option<i64>,
}

impl NoticeQuery {
    pub fn page(&self) -> (i64, i64) {
        (self.limit.unwrap_or(DEFAULT_PAGE_SIZE), self.offset.unwrap_or(0))
    }
}

/// A notice as submitted, before any checks.
#[derive(Debug)]
pub struct NoticeDraft {
    pub title: String,
    pub body: Option<String>,
    pub rules: Vec<TargetRule>,
    pub individuals: Vec<Uuid>,
    pub attachment: Option<UploadedFile>,
}

impl NoticeDraft {
    /// Reads `title`, `body`, `audience`, `individuals` and the first file part.
    pub fn from_form(mut form: MultipartForm) -> Result<Self, error::Error> {
        let title = form.require("title")?.to_string();
        if title.chars().count() > 200 {
            return Err(error::Error::bad_request("Title must be at most 200 characters long"));
        }

        Ok(NoticeDraft {
            body: form.text("body").map(str::to_string),
            rules: form.json("audience")?.unwrap_or_default(),
            individuals: form.json("individuals")?.unwrap_or_default(),
            attachment: form.take_file(),
            title,
        })
    }
}

pub struct NewNotice {
    pub kind: NoticeKind,
    pub title: String,
    pub body: Option<String>,
    pub uploaded_by: Uuid,
    pub audience: Audience,
    pub file_id: Option<Uuid>,
}
