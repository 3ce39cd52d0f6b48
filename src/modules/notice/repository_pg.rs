use sqlx::{types::Json, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    api::error,
    modules::{
        audience::{push_visibility_filter, Viewer},
        notice::{
            model::NewNotice,
            repository::NoticeRepository,
            schema::{NoticeEntity, NoticeKind},
        },
    },
};

#[derive(Clone)]
pub struct NoticeRepositoryPg {
    pool: sqlx::PgPool,
}

impl NoticeRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl NoticeRepository for NoticeRepositoryPg {
    async fn create(&self, notice: &NewNotice) -> Result<NoticeEntity, error::SystemError> {
        let entity = sqlx::query_as::<_, NoticeEntity>(
            r#"
            INSERT INTO notices (id, kind, title, body, uploaded_by, audience, individuals, file_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(notice.kind)
        .bind(&notice.title)
        .bind(&notice.body)
        .bind(notice.uploaded_by)
        .bind(Json(&notice.audience.rules))
        .bind(&notice.audience.individuals)
        .bind(notice.file_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(entity)
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<NoticeEntity>, error::SystemError> {
        let notice = sqlx::query_as::<_, NoticeEntity>("SELECT * FROM notices WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(notice)
    }

    async fn find_visible(
        &self,
        kind: NoticeKind,
        viewer: &Viewer,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<NoticeEntity>, error::SystemError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM notices WHERE kind = ");
        qb.push_bind(kind).push(" AND ");
        push_visibility_filter(&mut qb, viewer);
        qb.push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let notices = qb.build_query_as::<NoticeEntity>().fetch_all(&self.pool).await?;
        Ok(notices)
    }

    async fn find_sent(
        &self,
        kind: NoticeKind,
        uploaded_by: &Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<NoticeEntity>, error::SystemError> {
        let notices = sqlx::query_as::<_, NoticeEntity>(
            r#"
            SELECT * FROM notices
            WHERE kind = $1 AND uploaded_by = $2
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(kind)
        .bind(uploaded_by)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(notices)
    }

    async fn delete(&self, id: &Uuid) -> Result<bool, error::SystemError> {
        let result = sqlx::query("DELETE FROM notices WHERE id = $1").bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }
}
