use actix_web::{delete, get, post, web};
use uuid::Uuid;

use crate::{
    api::{error, success},
    modules::sub_role::{model, schema::SubRoleEntity, service::SubRoleService},
    utils::ValidatedJson,
};

#[get("")]
pub async fn list_sub_roles(
    sub_role_service: web::Data<SubRoleService>,
) -> Result<success::Success<Vec<SubRoleEntity>>, error::Error> {
    let sub_roles = sub_role_service.list().await?;
    Ok(success::Success::ok(Some(sub_roles)).message("Sub-roles retrieved successfully"))
}

#[post("")]
pub async fn create_sub_role(
    sub_role_service: web::Data<SubRoleService>,
    body: ValidatedJson<model::CreateSubRoleModel>,
) -> Result<success::Success<SubRoleEntity>, error::Error> {
    let sub_role = sub_role_service.create(body.0).await?;
    Ok(success::Success::created(Some(sub_role)).message("Sub-role created successfully"))
}

#[delete("/{id}")]
pub async fn delete_sub_role(
    sub_role_service: web::Data<SubRoleService>,
    id: web::Path<Uuid>,
) -> Result<success::Success<()>, error::Error> {
    sub_role_service.delete(id.into_inner()).await?;
    Ok(success::Success::no_content())
}
