use uuid::Uuid;

use crate::{
    api::error,
    modules::workshop::{model::NewWorkshop, repository::WorkshopRepository, schema::WorkshopEntity},
};

#[derive(Clone)]
pub struct WorkshopRepositoryPg {
    pool: sqlx::PgPool,
}

impl WorkshopRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl WorkshopRepository for WorkshopRepositoryPg {
    async fn create(&self, workshop: &NewWorkshop) -> Result<WorkshopEntity, error::SystemError> {
        let entity = sqlx::query_as::<_, WorkshopEntity>(
            r#"
            INSERT INTO workshops (id, title, description, department, venue, held_on, organized_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(&workshop.title)
        .bind(&workshop.description)
        .bind(&workshop.department)
        .bind(&workshop.venue)
        .bind(workshop.held_on)
        .bind(workshop.organized_by)
        .fetch_one(&self.pool)
        .await?;
        Ok(entity)
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<WorkshopEntity>, error::SystemError> {
        let entity = sqlx::query_as::<_, WorkshopEntity>("SELECT * FROM workshops WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(entity)
    }

    async fn list(&self, department: Option<&str>) -> Result<Vec<WorkshopEntity>, error::SystemError> {
        let entities = sqlx::query_as::<_, WorkshopEntity>(
            r#"
            SELECT * FROM workshops
            WHERE $1::TEXT IS NULL OR department = $1
            ORDER BY held_on DESC
            "#,
        )
        .bind(department)
        .fetch_all(&self.pool)
        .await?;
        Ok(entities)
    }

    async fn find_by_organizer(&self, organizer: &Uuid) -> Result<Vec<WorkshopEntity>, error::SystemError> {
        let entities = sqlx::query_as::<_, WorkshopEntity>(
            "SELECT * FROM workshops WHERE organized_by = $1 ORDER BY held_on DESC",
        )
        .bind(organizer)
        .fetch_all(&self.pool)
        .await?;
        Ok(entities)
    }

    async fn delete(&self, id: &Uuid) -> Result<bool, error::SystemError> {
        let result =
            sqlx::query("DELETE FROM workshops WHERE id = $1").bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }
}
