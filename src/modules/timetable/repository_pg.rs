use sqlx::{types::Json, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    api::error,
    modules::{
        audience::{push_visibility_filter, Viewer},
        timetable::{model::TimetableValues, repository::TimetableRepository, schema::TimetableEntity},
    },
};

#[derive(Clone)]
pub struct TimetableRepositoryPg {
    pool: sqlx::PgPool,
}

impl TimetableRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl TimetableRepository for TimetableRepositoryPg {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<TimetableEntity>, error::SystemError> {
        let timetable =
            sqlx::query_as::<_, TimetableEntity>("SELECT * FROM timetables WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(timetable)
    }

    async fn find_by_target(
        &self,
        department: &str,
        batch: Option<&str>,
    ) -> Result<Option<TimetableEntity>, error::SystemError> {
        let timetable = sqlx::query_as::<_, TimetableEntity>(
            "SELECT * FROM timetables WHERE department = $1 AND batch IS NOT DISTINCT FROM $2",
        )
        .bind(department)
        .bind(batch)
        .fetch_optional(&self.pool)
        .await?;
        Ok(timetable)
    }

    async fn create(&self, values: &TimetableValues) -> Result<TimetableEntity, error::SystemError> {
        let timetable = sqlx::query_as::<_, TimetableEntity>(
            r#"
            INSERT INTO timetables (id, title, department, batch, file_id, uploaded_by, audience, individuals)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(&values.title)
        .bind(&values.department)
        .bind(&values.batch)
        .bind(values.file_id)
        .bind(values.uploaded_by)
        .bind(Json(&values.audience.rules))
        .bind(&values.audience.individuals)
        .fetch_one(&self.pool)
        .await?;
        Ok(timetable)
    }

    async fn replace(
        &self,
        id: &Uuid,
        values: &TimetableValues,
    ) -> Result<TimetableEntity, error::SystemError> {
        sqlx::query_as::<_, TimetableEntity>(
            r#"
            UPDATE timetables
            SET title = $2, department = $3, batch = $4, file_id = $5, uploaded_by = $6,
                audience = $7, individuals = $8, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&values.title)
        .bind(&values.department)
        .bind(&values.batch)
        .bind(values.file_id)
        .bind(values.uploaded_by)
        .bind(Json(&values.audience.rules))
        .bind(&values.audience.individuals)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| error::SystemError::not_found("Timetable not found"))
    }

    async fn find_visible(&self, viewer: &Viewer) -> Result<Vec<TimetableEntity>, error::SystemError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM timetables WHERE ");
        push_visibility_filter(&mut qb, viewer);
        qb.push(" ORDER BY department, batch NULLS FIRST");

        let timetables = qb.build_query_as::<TimetableEntity>().fetch_all(&self.pool).await?;
        Ok(timetables)
    }

    async fn delete(&self, id: &Uuid) -> Result<bool, error::SystemError> {
        let result =
            sqlx::query("DELETE FROM timetables WHERE id = $1").bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn pin(&self, user_id: &Uuid, timetable_id: &Uuid) -> Result<(), error::SystemError> {
        sqlx::query(
            r#"
            INSERT INTO pinned_timetables (user_id, timetable_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(timetable_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn unpin(&self, user_id: &Uuid, timetable_id: &Uuid) -> Result<bool, error::SystemError> {
        let result =
            sqlx::query("DELETE FROM pinned_timetables WHERE user_id = $1 AND timetable_id = $2")
                .bind(user_id)
                .bind(timetable_id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_pinned(&self, user_id: &Uuid) -> Result<Vec<TimetableEntity>, error::SystemError> {
        let timetables = sqlx::query_as::<_, TimetableEntity>(
            r#"
            SELECT t.* FROM timetables t
            JOIN pinned_timetables p ON p.timetable_id = t.id
            WHERE p.user_id = $1
            ORDER BY p.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(timetables)
    }
}
