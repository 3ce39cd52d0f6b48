use actix_multipart::Multipart;
use actix_web::{delete, get, patch, post, web, HttpRequest};
use uuid::Uuid;

use crate::{
    api::{error, success},
    middlewares::get_claims,
    modules::drive::{model, schema::DriveItemEntity, service::DriveService},
    utils::{MultipartForm, ValidatedJson, ValidatedQuery},
    ENV,
};

#[get("")]
pub async fn list_items(
    drive_service: web::Data<DriveService>,
    req: HttpRequest,
    query: ValidatedQuery<model::ListQuery>,
) -> Result<success::Success<Vec<DriveItemEntity>>, error::Error> {
    let owner = get_claims(&req)?.sub;
    let items = drive_service.list(owner, query.0.parent_id).await?;
    Ok(success::Success::ok(Some(items)).message("Items retrieved successfully"))
}

#[get("/search")]
pub async fn search_items(
    drive_service: web::Data<DriveService>,
    req: HttpRequest,
    query: ValidatedQuery<model::SearchQuery>,
) -> Result<success::Success<Vec<DriveItemEntity>>, error::Error> {
    let owner = get_claims(&req)?.sub;
    let items = drive_service.search(owner, &query.0.q).await?;
    Ok(success::Success::ok(Some(items)))
}

#[post("/folders")]
pub async fn create_folder(
    drive_service: web::Data<DriveService>,
    req: HttpRequest,
    body: ValidatedJson<model::CreateFolderModel>,
) -> Result<success::Success<DriveItemEntity>, error::Error> {
    let owner = get_claims(&req)?.sub;
    let folder = drive_service.create_folder(owner, &body.0.name, body.0.parent_id).await?;
    Ok(success::Success::created(Some(folder)).message("Folder created successfully"))
}

/// Multipart: any number of file parts plus an optional `parent_id` field.
#[post("/files")]
pub async fn upload_files(
    drive_service: web::Data<DriveService>,
    req: HttpRequest,
    payload: Multipart,
) -> Result<success::Success<Vec<DriveItemEntity>>, error::Error> {
    let owner = get_claims(&req)?.sub;
    let mut form = MultipartForm::read(payload, ENV.max_upload_size).await?;

    let parent_id = form
        .text("parent_id")
        .map(Uuid::parse_str)
        .transpose()
        .map_err(|_| error::Error::bad_request("Invalid parent_id"))?;

    let items = drive_service.upload(owner, parent_id, form.take_files()).await?;
    Ok(success::Success::created(Some(items)).message("Files uploaded successfully"))
}

#[get("/{id}")]
pub async fn get_item(
    drive_service: web::Data<DriveService>,
    req: HttpRequest,
    id: web::Path<Uuid>,
) -> Result<success::Success<DriveItemEntity>, error::Error> {
    let owner = get_claims(&req)?.sub;
    let item = drive_service.get(owner, id.into_inner()).await?;
    Ok(success::Success::ok(Some(item)))
}

#[get("/{id}/path")]
pub async fn get_path(
    drive_service: web::Data<DriveService>,
    req: HttpRequest,
    id: web::Path<Uuid>,
) -> Result<success::Success<Vec<DriveItemEntity>>, error::Error> {
    let owner = get_claims(&req)?.sub;
    let path = drive_service.path(owner, id.into_inner()).await?;
    Ok(success::Success::ok(Some(path)))
}

#[get("/{id}/download")]
pub async fn download_item(
    drive_service: web::Data<DriveService>,
    req: HttpRequest,
    id: web::Path<Uuid>,
) -> Result<success::Download, error::Error> {
    let owner = get_claims(&req)?.sub;
    Ok(drive_service.download(owner, id.into_inner()).await?)
}

#[patch("/{id}")]
pub async fn rename_item(
    drive_service: web::Data<DriveService>,
    req: HttpRequest,
    id: web::Path<Uuid>,
    body: ValidatedJson<model::RenameModel>,
) -> Result<success::Success<DriveItemEntity>, error::Error> {
    let owner = get_claims(&req)?.sub;
    let item = drive_service.rename(owner, id.into_inner(), &body.0.name).await?;
    Ok(success::Success::ok(Some(item)).message("Item renamed successfully"))
}

#[post("/{id}/move")]
pub async fn move_item(
    drive_service: web::Data<DriveService>,
    req: HttpRequest,
    id: web::Path<Uuid>,
    body: ValidatedJson<model::DestinationModel>,
) -> Result<success::Success<DriveItemEntity>, error::Error> {
    let owner = get_claims(&req)?.sub;
    let item = drive_service.move_item(owner, id.into_inner(), body.0.parent_id).await?;
    Ok(success::Success::ok(Some(item)).message("Item moved successfully"))
}

#[post("/{id}/copy")]
pub async fn copy_item(
    drive_service: web::Data<DriveService>,
    req: HttpRequest,
    id: web::Path<Uuid>,
    body: ValidatedJson<model::DestinationModel>,
) -> Result<success::Success<DriveItemEntity>, error::Error> {
    let owner = get_claims(&req)?.sub;
    let item = drive_service.copy(owner, id.into_inner(), body.0.parent_id).await?;
    Ok(success::Success::created(Some(item)).message("Item copied successfully"))
}

#[delete("/{id}")]
pub async fn delete_item(
    drive_service: web::Data<DriveService>,
    req: HttpRequest,
    id: web::Path<Uuid>,
) -> Result<success::Success<()>, error::Error> {
    let owner = get_claims(&req)?.sub;
    drive_service.delete(owner, id.into_inner()).await?;
    Ok(success::Success::no_content())
}
