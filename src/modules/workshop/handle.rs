use actix_web::{delete, get, post, web, HttpRequest};
use uuid::Uuid;

use crate::{
    api::{error, success},
    middlewares::get_claims,
    modules::{
        user::{handle::current_user, service::UserService},
        workshop::{
            model::{CreateWorkshopModel, WorkshopQuery},
            schema::WorkshopEntity,
            service::WorkshopService,
        },
    },
    utils::{ValidatedJson, ValidatedQuery},
};

#[post("")]
pub async fn create_workshop(
    workshop_service: web::Data<WorkshopService>,
    user_service: web::Data<UserService>,
    req: HttpRequest,
    body: ValidatedJson<CreateWorkshopModel>,
) -> Result<success::Success<WorkshopEntity>, error::Error> {
    let organizer = current_user(&user_service, &req).await?;
    let workshop = workshop_service.create(&organizer, body.0).await?;
    Ok(success::Success::created(Some(workshop)).message("Workshop recorded successfully"))
}

#[get("")]
pub async fn list_workshops(
    workshop_service: web::Data<WorkshopService>,
    query: ValidatedQuery<WorkshopQuery>,
) -> Result<success::Success<Vec<WorkshopEntity>>, error::Error> {
    let workshops = workshop_service.list(query.0.department.as_deref()).await?;
    Ok(success::Success::ok(Some(workshops)))
}

#[get("/mine")]
pub async fn list_mine(
    workshop_service: web::Data<WorkshopService>,
    req: HttpRequest,
) -> Result<success::Success<Vec<WorkshopEntity>>, error::Error> {
    let organizer = get_claims(&req)?.sub;
    let workshops = workshop_service.mine(&organizer).await?;
    Ok(success::Success::ok(Some(workshops)))
}

#[delete("/{id}")]
pub async fn delete_workshop(
    workshop_service: web::Data<WorkshopService>,
    user_service: web::Data<UserService>,
    req: HttpRequest,
    id: web::Path<Uuid>,
) -> Result<success::Success<()>, error::Error> {
    let actor = current_user(&user_service, &req).await?;
    workshop_service.delete(&actor, id.into_inner()).await?;
    Ok(success::Success::no_content())
}
