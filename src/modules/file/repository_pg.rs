use uuid::Uuid;

use crate::{
    api::error,
    modules::file::{model::NewFile, repository::FileRepository, schema::FileEntity},
};

#[derive(Clone)]
pub struct FilePgRepository {
    pool: sqlx::PgPool,
}

impl FilePgRepository {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl FileRepository for FilePgRepository {
    async fn create(&self, file: &NewFile) -> Result<FileEntity, error::SystemError> {
        let entity = sqlx::query_as::<_, FileEntity>(
            r#"
            INSERT INTO files (id, storage_key, original_name, mime_type, size, uploaded_by, usage)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(&file.storage_key)
        .bind(&file.original_name)
        .bind(&file.mime_type)
        .bind(file.size)
        .bind(file.uploaded_by)
        .bind(file.usage)
        .fetch_one(&self.pool)
        .await?;

        Ok(entity)
    }

    async fn find_by_id(&self, file_id: &Uuid) -> Result<Option<FileEntity>, error::SystemError> {
        let file = sqlx::query_as::<_, FileEntity>("SELECT * FROM files WHERE id = $1")
            .bind(file_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(file)
    }

    async fn delete(&self, file_id: &Uuid) -> Result<(), error::SystemError> {
        sqlx::query("DELETE FROM files WHERE id = $1").bind(file_id).execute(&self.pool).await?;

        Ok(())
    }
}
