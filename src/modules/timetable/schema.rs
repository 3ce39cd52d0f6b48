use serde::Serialize;
use sqlx::{prelude::FromRow, types::Json};
use uuid::Uuid;

use crate::modules::audience::{Audience, TargetRule};

/// One timetable per (department, batch); a re-upload replaces it in place.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TimetableEntity {
    pub id: Uuid,
    pub title: String,
    pub department: String,
    pub batch: Option<String>,
    pub file_id: Uuid,
    pub uploaded_by: Uuid,
    pub audience: Json<Vec<TargetRule>>,
    pub individuals: Vec<Uuid>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl TimetableEntity {
    pub fn audience(&self) -> Audience {
        Audience { rules: self.audience.0.clone(), individuals: self.individuals.clone() }
    }
}
