use uuid::Uuid;

use crate::{
    api::error,
    modules::drive::{model::NewDriveItem, repository::DriveRepository, schema::DriveItemEntity},
};

#[derive(Clone)]
pub struct DriveRepositoryPg {
    pool: sqlx::PgPool,
}

impl DriveRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl DriveRepository for DriveRepositoryPg {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<DriveItemEntity>, error::SystemError> {
        let item = sqlx::query_as::<_, DriveItemEntity>("SELECT * FROM drive_items WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(item)
    }

    async fn find_sibling(
        &self,
        owner_id: &Uuid,
        parent_id: Option<Uuid>,
        name: &str,
    ) -> Result<Option<DriveItemEntity>, error::SystemError> {
        let item = sqlx::query_as::<_, DriveItemEntity>(
            r#"
            SELECT * FROM drive_items
            WHERE owner_id = $1 AND parent_id IS NOT DISTINCT FROM $2 AND name = $3
            LIMIT 1
            "#,
        )
        .bind(owner_id)
        .bind(parent_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(item)
    }

    async fn list_children(
        &self,
        owner_id: &Uuid,
        parent_id: Option<Uuid>,
    ) -> Result<Vec<DriveItemEntity>, error::SystemError> {
        let items = sqlx::query_as::<_, DriveItemEntity>(
            r#"
            SELECT * FROM drive_items
            WHERE owner_id = $1 AND parent_id IS NOT DISTINCT FROM $2
            ORDER BY kind = 'file', lower(name)
            "#,
        )
        .bind(owner_id)
        .bind(parent_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    async fn create(&self, item: &NewDriveItem) -> Result<DriveItemEntity, error::SystemError> {
        let entity = sqlx::query_as::<_, DriveItemEntity>(
            r#"
            INSERT INTO drive_items (id, owner_id, parent_id, name, kind, file_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(item.owner_id)
        .bind(item.parent_id)
        .bind(&item.name)
        .bind(item.kind)
        .bind(item.file_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(entity)
    }

    async fn rename(&self, id: &Uuid, name: &str) -> Result<DriveItemEntity, error::SystemError> {
        sqlx::query_as::<_, DriveItemEntity>(
            "UPDATE drive_items SET name = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| error::SystemError::not_found("Item not found"))
    }

    async fn set_parent(
        &self,
        id: &Uuid,
        parent_id: Option<Uuid>,
    ) -> Result<DriveItemEntity, error::SystemError> {
        sqlx::query_as::<_, DriveItemEntity>(
            "UPDATE drive_items SET parent_id = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(parent_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| error::SystemError::not_found("Item not found"))
    }

    async fn delete(&self, id: &Uuid) -> Result<(), error::SystemError> {
        sqlx::query("DELETE FROM drive_items WHERE id = $1").bind(id).execute(&self.pool).await?;
        Ok(())
    }

    async fn search(
        &self,
        owner_id: &Uuid,
        query: &str,
        limit: i64,
    ) -> Result<Vec<DriveItemEntity>, error::SystemError> {
        let pattern = format!(
            "%{}%",
            query.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
        );
        let items = sqlx::query_as::<_, DriveItemEntity>(
            r#"
            SELECT * FROM drive_items
            WHERE owner_id = $1 AND name ILIKE $2
            LIMIT $3
            "#,
        )
        .bind(owner_id)
        .bind(&pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }
}
