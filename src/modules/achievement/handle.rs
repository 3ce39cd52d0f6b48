use actix_multipart::Multipart;
use actix_web::{delete, get, post, web, HttpRequest};
use uuid::Uuid;

use crate::{
    api::{error, success},
    modules::{
        achievement::{
            model::{AchievementDraft, AchievementQuery, ReviewModel},
            schema::{AchievementEntity, AchievementStatus},
            service::AchievementService,
        },
        user::{handle::current_user, service::UserService},
    },
    utils::{MultipartForm, ValidatedJson, ValidatedQuery},
    ENV,
};

#[post("")]
pub async fn submit_achievement(
    achievement_service: web::Data<AchievementService>,
    user_service: web::Data<UserService>,
    req: HttpRequest,
    payload: Multipart,
) -> Result<success::Success<AchievementEntity>, error::Error> {
    let student = current_user(&user_service, &req).await?;
    let draft = AchievementDraft::from_form(MultipartForm::read(payload, ENV.max_upload_size).await?)?;
    let achievement = achievement_service.submit(&student, draft).await?;
    Ok(success::Success::created(Some(achievement)).message("Achievement submitted for review"))
}

#[get("/mine")]
pub async fn list_mine(
    achievement_service: web::Data<AchievementService>,
    user_service: web::Data<UserService>,
    req: HttpRequest,
) -> Result<success::Success<Vec<AchievementEntity>>, error::Error> {
    let student = current_user(&user_service, &req).await?;
    let achievements = achievement_service.mine(&student).await?;
    Ok(success::Success::ok(Some(achievements)))
}

#[get("")]
pub async fn list_achievements(
    achievement_service: web::Data<AchievementService>,
    user_service: web::Data<UserService>,
    req: HttpRequest,
    query: ValidatedQuery<AchievementQuery>,
) -> Result<success::Success<Vec<AchievementEntity>>, error::Error> {
    let actor = current_user(&user_service, &req).await?;
    let achievements = achievement_service.list(&actor, query.0).await?;
    Ok(success::Success::ok(Some(achievements)))
}

async fn review(
    achievement_service: &AchievementService,
    user_service: &UserService,
    req: &HttpRequest,
    id: Uuid,
    status: AchievementStatus,
    body: ReviewModel,
) -> Result<AchievementEntity, error::Error> {
    let actor = current_user(user_service, req).await?;
    Ok(achievement_service.review(&actor, id, status, body.remarks).await?)
}

#[post("/{id}/approve")]
pub async fn approve_achievement(
    achievement_service: web::Data<AchievementService>,
    user_service: web::Data<UserService>,
    req: HttpRequest,
    id: web::Path<Uuid>,
    body: ValidatedJson<ReviewModel>,
) -> Result<success::Success<AchievementEntity>, error::Error> {
    let achievement = review(
        &achievement_service,
        &user_service,
        &req,
        id.into_inner(),
        AchievementStatus::Approved,
        body.0,
    )
    .await?;
    Ok(success::Success::ok(Some(achievement)).message("Achievement approved"))
}

#[post("/{id}/reject")]
pub async fn reject_achievement(
    achievement_service: web::Data<AchievementService>,
    user_service: web::Data<UserService>,
    req: HttpRequest,
    id: web::Path<Uuid>,
    body: ValidatedJson<ReviewModel>,
) -> Result<success::Success<AchievementEntity>, error::Error> {
    let achievement = review(
        &achievement_service,
        &user_service,
        &req,
        id.into_inner(),
        AchievementStatus::Rejected,
        body.0,
    )
    .await?;
    Ok(success::Success::ok(Some(achievement)).message("Achievement rejected"))
}

#[get("/{id}/proof")]
pub async fn download_proof(
    achievement_service: web::Data<AchievementService>,
    user_service: web::Data<UserService>,
    req: HttpRequest,
    id: web::Path<Uuid>,
) -> Result<success::Download, error::Error> {
    let actor = current_user(&user_service, &req).await?;
    Ok(achievement_service.proof(&actor, id.into_inner()).await?)
}

#[delete("/{id}")]
pub async fn delete_achievement(
    achievement_service: web::Data<AchievementService>,
    user_service: web::Data<UserService>,
    req: HttpRequest,
    id: web::Path<Uuid>,
) -> Result<success::Success<()>, error::Error> {
    let actor = current_user(&user_service, &req).await?;
    achievement_service.delete(&actor, id.into_inner()).await?;
    Ok(success::Success::no_content())
}
