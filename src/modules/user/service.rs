use log::info;
use std::sync::Arc;
use uuid::Uuid;

use crate::api::error;
use crate::configs::RedisCache;
use crate::constants::PROFILE_CACHE_TTL;
use crate::modules::sub_role::{
    schema::SubRoleEntity,
    service::{normalize_code, SubRoleService},
};
use crate::modules::user::model::{
    ChangePasswordModel, CreateUserModel, InsertUser, SignInModel, SignUpModel,
    UpdatePermissions, UpdatePermissionsModel, UserQuery, UserResponse,
};
use crate::modules::user::{repository::UserRepository, schema::UserRole};
use crate::utils::{hash_password, verify_password, Claims, TypeClaims};
use crate::ENV;

/// Only a SuperAdmin may mint administrators; admins create everyone else.
pub fn can_create_role(actor: UserRole, role: UserRole) -> bool {
    match actor {
        UserRole::SuperAdmin => true,
        UserRole::Admin => !role.is_admin(),
        _ => false,
    }
}

/// Admins manage anyone; an HOD manages non-admin staff and students of their own department.
pub fn can_manage_permissions(actor: &UserResponse, target: &UserResponse) -> bool {
    if actor.role.is_admin() {
        return true;
    }
    actor.role == UserRole::Hod
        && !target.role.is_hod_or_above()
        && actor.sub_role.is_some()
        && actor.sub_role == target.sub_role
}

/// Checks the role/department/batch combination of a new account.
pub fn check_placement(
    role: UserRole,
    sub_role: Option<&SubRoleEntity>,
    batch: Option<&str>,
) -> Result<(), error::SystemError> {
    if let Some(sub_role) = sub_role {
        if !sub_role.allows(role) {
            return Err(error::SystemError::bad_request(format!(
                "Role {} cannot belong to {}",
                role.as_str(),
                sub_role.code
            )));
        }
    }
    if role.is_student() {
        if sub_role.is_none() || batch.is_none() {
            return Err(error::SystemError::bad_request("Students need a department and a batch"));
        }
    } else if batch.is_some() {
        return Err(error::SystemError::bad_request("Only students have a batch"));
    }
    Ok(())
}

#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository + Send + Sync>,
    sub_roles: SubRoleService,
    cache: Arc<RedisCache>,
}

impl UserService {
    pub fn with_dependencies(
        repo: Arc<dyn UserRepository + Send + Sync>,
        sub_roles: SubRoleService,
        cache: Arc<RedisCache>,
    ) -> Self {
        info!("UserService initialized with dependencies");
        UserService { repo, sub_roles, cache }
    }

    fn cache_key(id: &Uuid) -> String {
        format!("user:{}", id)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<UserResponse, error::SystemError> {
        let key = Self::cache_key(&id);
        if let Some(cached_user) = self.cache.get::<UserResponse>(&key).await? {
            return Ok(cached_user);
        }
        let entity = self
            .repo
            .find_by_id(&id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("User not found"))?;

        let user = UserResponse::from(entity);
        self.cache.set(&key, &user, PROFILE_CACHE_TTL).await?;
        info!("User {} cached", id);
        Ok(user)
    }

    async fn resolve_sub_role(
        &self,
        code: Option<&str>,
    ) -> Result<Option<SubRoleEntity>, error::SystemError> {
        let Some(code) = code else {
            return Ok(None);
        };
        let sub_role = self
            .sub_roles
            .resolve(code)
            .await?
            .ok_or_else(|| error::SystemError::bad_request(format!("Unknown department '{code}'")))?;
        Ok(Some(sub_role))
    }

    pub async fn sign_up(&self, user: SignUpModel) -> Result<Uuid, error::SystemError> {
        let sub_role = self.resolve_sub_role(Some(&user.sub_role)).await?;
        let batch = user.batch.trim().to_string();
        check_placement(UserRole::Student, sub_role.as_ref(), Some(&batch))?;

        let new_user = InsertUser {
            username: user.username.trim().to_string(),
            hash_password: hash_password(&user.password)?,
            role: UserRole::Student,
            sub_role_id: sub_role.map(|s| s.id),
            batch: Some(batch),
            can_upload_timetable: false,
            can_approve_achievements: false,
        };

        let user_id = self.repo.create(&new_user).await?;
        info!("Student {} registered", user_id);
        Ok(user_id)
    }

    pub async fn create_user(
        &self,
        actor: &UserResponse,
        user: CreateUserModel,
    ) -> Result<Uuid, error::SystemError> {
        if !can_create_role(actor.role, user.role) {
            return Err(error::SystemError::forbidden(format!(
                "You cannot create {} accounts",
                user.role.as_str()
            )));
        }

        let sub_role = self.resolve_sub_role(user.sub_role.as_deref()).await?;
        let batch = user.batch.map(|b| b.trim().to_string()).filter(|b| !b.is_empty());
        check_placement(user.role, sub_role.as_ref(), batch.as_deref())?;

        let new_user = InsertUser {
            username: user.username.trim().to_string(),
            hash_password: hash_password(&user.password)?,
            role: user.role,
            sub_role_id: sub_role.map(|s| s.id),
            batch,
            can_upload_timetable: user.can_upload_timetable,
            can_approve_achievements: user.can_approve_achievements,
        };

        let user_id = self.repo.create(&new_user).await?;
        info!("User {} created by {}", user_id, actor.id);
        Ok(user_id)
    }

    async fn issue_tokens(
        &self,
        id: &Uuid,
        role: &UserRole,
    ) -> Result<(String, String), error::SystemError> {
        let access_token = Claims::new(id, role, ENV.access_token_expiration)
            .with_type(TypeClaims::AccessToken)
            .encode(ENV.jwt_secret.as_ref())?;

        let jti = Uuid::new_v7(uuid::Timestamp::now(uuid::NoContext));

        let refresh_token = Claims::new(id, role, ENV.refresh_token_expiration)
            .with_jti(jti)
            .with_type(TypeClaims::RefreshToken)
            .encode(ENV.jwt_secret.as_ref())?;

        let refresh_key = format!("refresh_token:{jti}");
        self.cache.set(&refresh_key, id, ENV.refresh_token_expiration as usize).await?;

        Ok((access_token, refresh_token))
    }

    pub async fn sign_in(&self, user: SignInModel) -> Result<(String, String), error::SystemError> {
        let user_entity = self
            .repo
            .find_by_username(&user.username)
            .await?
            .ok_or_else(|| error::SystemError::unauthorized("Invalid username or password"))?;

        let valid = verify_password(&user_entity.hash_password, &user.password)?;
        if !valid {
            return Err(error::SystemError::unauthorized("Invalid username or password"));
        }

        self.issue_tokens(&user_entity.id, &user_entity.role).await
    }

    async fn consume_refresh_token(
        &self,
        refresh_token: Option<String>,
    ) -> Result<Claims, error::SystemError> {
        let token =
            refresh_token.ok_or_else(|| error::SystemError::unauthorized("Missing refresh token"))?;

        let claims = Claims::decode(&token, ENV.jwt_secret.as_ref())
            .map_err(|_| error::SystemError::unauthorized("Refresh token invalid or expired"))?;

        let jti = match (&claims._type, claims.jti) {
            (Some(TypeClaims::RefreshToken), Some(jti)) => jti,
            _ => return Err(error::SystemError::unauthorized("Refresh token invalid or expired")),
        };

        let key = format!("refresh_token:{jti}");
        let owner: Option<Uuid> = self.cache.get(&key).await?;
        if owner != Some(claims.sub) {
            return Err(error::SystemError::unauthorized("Refresh token invalid or expired"));
        }
        self.cache.delete(&key).await?;

        Ok(claims)
    }

    pub async fn refresh(
        &self,
        refresh_token: Option<String>,
    ) -> Result<(String, String), error::SystemError> {
        let claims = self.consume_refresh_token(refresh_token).await?;
        // role may have changed since the token was minted
        let user = self.get_by_id(claims.sub).await?;
        self.issue_tokens(&user.id, &user.role).await
    }

    pub async fn sign_out(&self, refresh_token: Option<String>) -> Result<(), error::SystemError> {
        if refresh_token.is_none() {
            return Ok(());
        }
        match self.consume_refresh_token(refresh_token).await {
            Ok(_) | Err(error::SystemError::Unauthorized(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }

    pub async fn change_password(
        &self,
        id: Uuid,
        model: ChangePasswordModel,
    ) -> Result<(), error::SystemError> {
        let entity = self
            .repo
            .find_by_id(&id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("User not found"))?;

        if !verify_password(&entity.hash_password, &model.current_password)? {
            return Err(error::SystemError::bad_request("Current password is incorrect"));
        }

        self.repo.update_password(&id, &hash_password(&model.new_password)?).await?;
        info!("User {} changed password", id);
        Ok(())
    }

    pub async fn update_permissions(
        &self,
        actor: &UserResponse,
        target_id: Uuid,
        model: UpdatePermissionsModel,
    ) -> Result<UserResponse, error::SystemError> {
        if model.can_upload_timetable.is_none() && model.can_approve_achievements.is_none() {
            return Err(error::SystemError::bad_request("No fields to update"));
        }

        let target = self.get_by_id(target_id).await?;
        if !can_manage_permissions(actor, &target) {
            return Err(error::SystemError::forbidden("You cannot change this user's permissions"));
        }

        let updated = self
            .repo
            .update_permissions(
                &target_id,
                &UpdatePermissions {
                    can_upload_timetable: model.can_upload_timetable,
                    can_approve_achievements: model.can_approve_achievements,
                },
            )
            .await?;

        self.cache.delete(&Self::cache_key(&target_id)).await?;
        info!("Permissions of {} updated by {}", target_id, actor.id);
        Ok(UserResponse::from(updated))
    }

    pub async fn list(
        &self,
        actor: &UserResponse,
        query: UserQuery,
    ) -> Result<Vec<UserResponse>, error::SystemError> {
        if !actor.role.is_hod_or_above() {
            return Err(error::SystemError::forbidden("No permission"));
        }

        // an HOD only sees their own department
        let sub_role = if actor.role.is_institution_wide() {
            query.sub_role.as_deref().map(normalize_code)
        } else {
            Some(actor.sub_role.clone().ok_or_else(|| {
                error::SystemError::forbidden("You are not attached to a department")
            })?)
        };

        let users = self
            .repo
            .list(
                query.role,
                sub_role.as_deref(),
                query.limit.unwrap_or(50),
                query.offset.unwrap_or(0),
            )
            .await?;
        Ok(users.into_iter().map(UserResponse::from).collect())
    }
}
