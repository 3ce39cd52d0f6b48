use uuid::Uuid;

use crate::{
    api::error,
    modules::{
        audience::Viewer,
        timetable::{model::TimetableValues, schema::TimetableEntity},
    },
};

#[async_trait::async_trait]
pub trait TimetableRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<TimetableEntity>, error::SystemError>;

    async fn find_by_target(
        &self,
        department: &str,
        batch: Option<&str>,
    ) -> Result<Option<TimetableEntity>, error::SystemError>;

    async fn create(&self, values: &TimetableValues) -> Result<TimetableEntity, error::SystemError>;

    /// Overwrites every column of an existing row, keeping its id.
    async fn replace(
        &self,
        id: &Uuid,
        values: &TimetableValues,
    ) -> Result<TimetableEntity, error::SystemError>;

    async fn find_visible(&self, viewer: &Viewer) -> Result<Vec<TimetableEntity>, error::SystemError>;

    async fn delete(&self, id: &Uuid) -> Result<bool, error::SystemError>;

    async fn pin(&self, user_id: &Uuid, timetable_id: &Uuid) -> Result<(), error::SystemError>;

    async fn unpin(&self, user_id: &Uuid, timetable_id: &Uuid) -> Result<bool, error::SystemError>;

    async fn find_pinned(&self, user_id: &Uuid) -> Result<Vec<TimetableEntity>, error::SystemError>;
}
