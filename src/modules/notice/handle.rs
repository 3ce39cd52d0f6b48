use actix_multipart::Multipart;
use actix_web::{delete, get, post, web, HttpRequest};
use uuid::Uuid;

use crate::{
    api::{error, success},
    middlewares::get_claims,
    modules::{
        notice::{
            model::{NoticeDraft, NoticeQuery},
            schema::{NoticeEntity, NoticeKind},
            service::NoticeService,
        },
        user::{handle::current_user, service::UserService},
    },
    utils::{MultipartForm, ValidatedQuery},
    ENV,
};

// Every handler reads its `NoticeKind` from the scope's app data.

#[post("")]
pub async fn publish_notice(
    notice_service: web::Data<NoticeService>,
    user_service: web::Data<UserService>,
    kind: web::Data<NoticeKind>,
    req: HttpRequest,
    payload: Multipart,
) -> Result<success::Success<NoticeEntity>, error::Error> {
    let author = current_user(&user_service, &req).await?;
    let draft = NoticeDraft::from_form(MultipartForm::read(payload, ENV.max_upload_size).await?)?;
    let notice = notice_service.publish(**kind, &author, draft).await?;
    Ok(success::Success::created(Some(notice))
        .message(format!("{} published successfully", kind.label())))
}

#[get("")]
pub async fn list_notices(
    notice_service: web::Data<NoticeService>,
    user_service: web::Data<UserService>,
    kind: web::Data<NoticeKind>,
    req: HttpRequest,
    query: ValidatedQuery<NoticeQuery>,
) -> Result<success::Success<Vec<NoticeEntity>>, error::Error> {
    let viewer = current_user(&user_service, &req).await?.viewer();
    let (limit, offset) = query.0.page();
    let notices = notice_service.visible(**kind, &viewer, limit, offset).await?;
    Ok(success::Success::ok(Some(notices)))
}

#[get("/sent")]
pub async fn list_sent(
    notice_service: web::Data<NoticeService>,
    kind: web::Data<NoticeKind>,
    req: HttpRequest,
    query: ValidatedQuery<NoticeQuery>,
) -> Result<success::Success<Vec<NoticeEntity>>, error::Error> {
    let author_id = get_claims(&req)?.sub;
    let (limit, offset) = query.0.page();
    let notices = notice_service.sent(**kind, author_id, limit, offset).await?;
    Ok(success::Success::ok(Some(notices)))
}

#[get("/{id}")]
pub async fn get_notice(
    notice_service: web::Data<NoticeService>,
    user_service: web::Data<UserService>,
    kind: web::Data<NoticeKind>,
    req: HttpRequest,
    id: web::Path<Uuid>,
) -> Result<success::Success<NoticeEntity>, error::Error> {
    let viewer = current_user(&user_service, &req).await?.viewer();
    let notice = notice_service.get(**kind, id.into_inner(), &viewer).await?;
    Ok(success::Success::ok(Some(notice)))
}

#[get("/{id}/attachment")]
pub async fn download_attachment(
    notice_service: web::Data<NoticeService>,
    user_service: web::Data<UserService>,
    kind: web::Data<NoticeKind>,
    req: HttpRequest,
    id: web::Path<Uuid>,
) -> Result<success::Download, error::Error> {
    let viewer = current_user(&user_service, &req).await?.viewer();
    Ok(notice_service.attachment(**kind, id.into_inner(), &viewer).await?)
}

#[delete("/{id}")]
pub async fn delete_notice(
    notice_service: web::Data<NoticeService>,
    user_service: web::Data<UserService>,
    kind: web::Data<NoticeKind>,
    req: HttpRequest,
    id: web::Path<Uuid>,
) -> Result<success::Success<()>, error::Error> {
    let actor = current_user(&user_service, &req).await?;
    notice_service.delete(**kind, id.into_inner(), &actor).await?;
    Ok(success::Success::no_content())
}
