use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    api::error,
    modules::achievement::{
        model::{NewAchievement, Review},
        repository::AchievementRepository,
        schema::{AchievementEntity, AchievementStatus},
    },
};

#[derive(Clone)]
pub struct AchievementRepositoryPg {
    pool: sqlx::PgPool,
}

impl AchievementRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl AchievementRepository for AchievementRepositoryPg {
    async fn create(&self, achievement: &NewAchievement) -> Result<AchievementEntity, error::SystemError> {
        let entity = sqlx::query_as::<_, AchievementEntity>(
            r#"
            INSERT INTO achievements (id, student_id, title, description, category, department, file_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(achievement.student_id)
        .bind(&achievement.title)
        .bind(&achievement.description)
        .bind(&achievement.category)
        .bind(&achievement.department)
        .bind(achievement.file_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(entity)
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<AchievementEntity>, error::SystemError> {
        let entity =
            sqlx::query_as::<_, AchievementEntity>("SELECT * FROM achievements WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(entity)
    }

    async fn find_by_student(&self, student_id: &Uuid) -> Result<Vec<AchievementEntity>, error::SystemError> {
        let entities = sqlx::query_as::<_, AchievementEntity>(
            "SELECT * FROM achievements WHERE student_id = $1 ORDER BY created_at DESC",
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(entities)
    }

    async fn list(
        &self,
        department: Option<&str>,
        status: Option<AchievementStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AchievementEntity>, error::SystemError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM achievements WHERE TRUE");
        if let Some(department) = department {
            qb.push(" AND department = ").push_bind(department);
        }
        if let Some(status) = status {
            qb.push(" AND status = ").push_bind(status);
        }
        qb.push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let entities = qb.build_query_as::<AchievementEntity>().fetch_all(&self.pool).await?;
        Ok(entities)
    }

    async fn review(
        &self,
        id: &Uuid,
        review: &Review,
    ) -> Result<Option<AchievementEntity>, error::SystemError> {
        let entity = sqlx::query_as::<_, AchievementEntity>(
            r#"
            UPDATE achievements
            SET status = $2, reviewed_by = $3, remarks = $4, reviewed_at = NOW()
            WHERE id = $1 AND status = 'Pending'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(review.status)
        .bind(review.reviewed_by)
        .bind(&review.remarks)
        .fetch_optional(&self.pool)
        .await?;
        Ok(entity)
    }

    async fn count_pending(&self, department: Option<&str>) -> Result<i64, error::SystemError> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM achievements
            WHERE status = 'Pending' AND ($1::TEXT IS NULL OR department = $1)
            "#,
        )
        .bind(department)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn delete(&self, id: &Uuid) -> Result<bool, error::SystemError> {
        let result =
            sqlx::query("DELETE FROM achievements WHERE id = $1").bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }
}
