use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    api::error,
    modules::user::{
        model::{InsertUser, UpdatePermissions},
        repository::UserRepository,
        schema::{UserEntity, UserRole},
    },
};

const SELECT_USER: &str = r#"
    SELECT u.*, s.code AS sub_role_code
    FROM users u
    LEFT JOIN sub_roles s ON s.id = u.sub_role_id
"#;

#[derive(Clone)]
pub struct UserRepositoryPg {
    pool: sqlx::PgPool,
}

impl UserRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl UserRepository for UserRepositoryPg {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<UserEntity>, error::SystemError> {
        let user = sqlx::query_as::<_, UserEntity>(&format!("{SELECT_USER} WHERE u.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserEntity>, error::SystemError> {
        let user = sqlx::query_as::<_, UserEntity>(&format!(
            "{SELECT_USER} WHERE lower(u.username) = lower($1)"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn create(&self, user: &InsertUser) -> Result<Uuid, error::SystemError> {
        let id = Uuid::new_v7(uuid::Timestamp::now(uuid::NoContext));
        sqlx::query(
            r#"
            INSERT INTO users
                (id, username, hash_password, role, sub_role_id, batch, can_upload_timetable, can_approve_achievements)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(id)
        .bind(&user.username)
        .bind(&user.hash_password)
        .bind(user.role)
        .bind(user.sub_role_id)
        .bind(&user.batch)
        .bind(user.can_upload_timetable)
        .bind(user.can_approve_achievements)
        .execute(&self.pool)
        .await?;
        Ok(id)
    }

    async fn update_password(
        &self,
        id: &Uuid,
        hash_password: &str,
    ) -> Result<(), error::SystemError> {
        let rows = sqlx::query(
            "UPDATE users SET hash_password = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(hash_password)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if rows == 0 {
            return Err(error::SystemError::not_found("User not found"));
        }
        Ok(())
    }

    async fn update_permissions(
        &self,
        id: &Uuid,
        permissions: &UpdatePermissions,
    ) -> Result<UserEntity, error::SystemError> {
        sqlx::query(
            r#"
            UPDATE users
            SET
                can_upload_timetable     = COALESCE($2, can_upload_timetable),
                can_approve_achievements = COALESCE($3, can_approve_achievements),
                updated_at               = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(permissions.can_upload_timetable)
        .bind(permissions.can_approve_achievements)
        .execute(&self.pool)
        .await?;

        self.find_by_id(id).await?.ok_or_else(|| error::SystemError::not_found("User not found"))
    }

    async fn list(
        &self,
        role: Option<UserRole>,
        sub_role: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<UserEntity>, error::SystemError> {
        let mut qb = QueryBuilder::<Postgres>::new(SELECT_USER);
        qb.push(" WHERE TRUE");
        if let Some(role) = role {
            qb.push(" AND u.role = ").push_bind(role);
        }
        if let Some(code) = sub_role {
            qb.push(" AND s.code = ").push_bind(code.to_string());
        }
        qb.push(" ORDER BY u.username LIMIT ").push_bind(limit).push(" OFFSET ").push_bind(offset);

        let users = qb.build_query_as::<UserEntity>().fetch_all(&self.pool).await?;
        Ok(users)
    }
}
