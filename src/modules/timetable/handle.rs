use actix_multipart::Multipart;
use actix_web::{delete, get, post, web, HttpRequest};
use uuid::Uuid;

use crate::{
    api::{error, success},
    modules::{
        timetable::{model::TimetableDraft, schema::TimetableEntity, service::TimetableService},
        user::{handle::current_user, service::UserService},
    },
    utils::MultipartForm,
    ENV,
};

#[post("")]
pub async fn upload_timetable(
    timetable_service: web::Data<TimetableService>,
    user_service: web::Data<UserService>,
    req: HttpRequest,
    payload: Multipart,
) -> Result<success::Success<TimetableEntity>, error::Error> {
    let actor = current_user(&user_service, &req).await?;
    let draft = TimetableDraft::from_form(MultipartForm::read(payload, ENV.max_upload_size).await?)?;
    let timetable = timetable_service.upload(&actor, draft).await?;
    Ok(success::Success::created(Some(timetable)).message("Timetable uploaded successfully"))
}

#[get("")]
pub async fn list_timetables(
    timetable_service: web::Data<TimetableService>,
    user_service: web::Data<UserService>,
    req: HttpRequest,
) -> Result<success::Success<Vec<TimetableEntity>>, error::Error> {
    let viewer = current_user(&user_service, &req).await?.viewer();
    let timetables = timetable_service.visible(&viewer).await?;
    Ok(success::Success::ok(Some(timetables)))
}

#[get("/pinned")]
pub async fn list_pinned(
    timetable_service: web::Data<TimetableService>,
    user_service: web::Data<UserService>,
    req: HttpRequest,
) -> Result<success::Success<Vec<TimetableEntity>>, error::Error> {
    let viewer = current_user(&user_service, &req).await?.viewer();
    let timetables = timetable_service.pinned(&viewer).await?;
    Ok(success::Success::ok(Some(timetables)))
}

#[post("/{id}/pin")]
pub async fn pin_timetable(
    timetable_service: web::Data<TimetableService>,
    user_service: web::Data<UserService>,
    req: HttpRequest,
    id: web::Path<Uuid>,
) -> Result<success::Success<()>, error::Error> {
    let viewer = current_user(&user_service, &req).await?.viewer();
    timetable_service.pin(&viewer, id.into_inner()).await?;
    Ok(success::Success::ok(None).message("Timetable pinned"))
}

#[delete("/{id}/pin")]
pub async fn unpin_timetable(
    timetable_service: web::Data<TimetableService>,
    user_service: web::Data<UserService>,
    req: HttpRequest,
    id: web::Path<Uuid>,
) -> Result<success::Success<()>, error::Error> {
    let viewer = current_user(&user_service, &req).await?.viewer();
    timetable_service.unpin(&viewer, id.into_inner()).await?;
    Ok(success::Success::no_content())
}

#[get("/{id}/attachment")]
pub async fn download_timetable(
    timetable_service: web::Data<TimetableService>,
    user_service: web::Data<UserService>,
    req: HttpRequest,
    id: web::Path<Uuid>,
) -> Result<success::Download, error::Error> {
    let viewer = current_user(&user_service, &req).await?.viewer();
    Ok(timetable_service.attachment(&viewer, id.into_inner()).await?)
}

#[delete("/{id}")]
pub async fn delete_timetable(
    timetable_service: web::Data<TimetableService>,
    user_service: web::Data<UserService>,
    req: HttpRequest,
    id: web::Path<Uuid>,
) -> Result<success::Success<()>, error::Error> {
    let actor = current_user(&user_service, &req).await?;
    timetable_service.delete(&actor, id.into_inner()).await?;
    Ok(success::Success::no_content())
}
