use uuid::Uuid;

use crate::{
    api::error,
    modules::sub_role::{
        model::InsertSubRole, repository::SubRoleRepository, schema::SubRoleEntity,
    },
};

#[derive(Clone)]
pub struct SubRoleRepositoryPg {
    pool: sqlx::PgPool,
}

impl SubRoleRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl SubRoleRepository for SubRoleRepositoryPg {
    async fn find_by_code(&self, code: &str) -> Result<Option<SubRoleEntity>, error::SystemError> {
        let sub_role =
            sqlx::query_as::<_, SubRoleEntity>("SELECT * FROM sub_roles WHERE code = $1")
                .bind(code)
                .fetch_optional(&self.pool)
                .await?;
        Ok(sub_role)
    }

    async fn list(&self) -> Result<Vec<SubRoleEntity>, error::SystemError> {
        let sub_roles = sqlx::query_as::<_, SubRoleEntity>("SELECT * FROM sub_roles ORDER BY code")
            .fetch_all(&self.pool)
            .await?;
        Ok(sub_roles)
    }

    async fn create(&self, sub_role: &InsertSubRole) -> Result<SubRoleEntity, error::SystemError> {
        let entity = sqlx::query_as::<_, SubRoleEntity>(
            r#"
            INSERT INTO sub_roles (id, code, name, allowed_roles)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(&sub_role.code)
        .bind(&sub_role.name)
        .bind(&sub_role.allowed_roles)
        .fetch_one(&self.pool)
        .await?;
        Ok(entity)
    }

    async fn delete(&self, id: &Uuid) -> Result<bool, error::SystemError> {
        let rows = sqlx::query("DELETE FROM sub_roles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(rows > 0)
    }
}
