use uuid::Uuid;

use crate::{
    api::error,
    modules::achievement::{
        model::{NewAchievement, Review},
        schema::{AchievementEntity, AchievementStatus},
    },
};

#[async_trait::async_trait]
pub trait AchievementRepository {
    async fn create(&self, achievement: &NewAchievement) -> Result<AchievementEntity, error::SystemError>;

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<AchievementEntity>, error::SystemError>;

    async fn find_by_student(&self, student_id: &Uuid) -> Result<Vec<AchievementEntity>, error::SystemError>;

    /// `department = None` lists every department.
    async fn list(
        &self,
        department: Option<&str>,
        status: Option<AchievementStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AchievementEntity>, error::SystemError>;

    /// Applies the review only while the achievement is still pending.
    async fn review(
        &self,
        id: &Uuid,
        review: &Review,
    ) -> Result<Option<AchievementEntity>, error::SystemError>;

    async fn count_pending(&self, department: Option<&str>) -> Result<i64, error::SystemError>;

    async fn delete(&self, id: &Uuid) -> Result<bool, error::SystemError>;
}
