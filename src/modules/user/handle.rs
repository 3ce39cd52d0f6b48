use actix_web::{
    cookie::{time, Cookie},
    get, patch, post, web, HttpRequest,
};
use uuid::Uuid;

use crate::modules::user::model::SignUpResponse;
use crate::modules::user::{model, service::UserService};
use crate::{
    api::{error, success},
    utils::{ValidatedJson, ValidatedQuery},
};
use crate::{middlewares::get_claims, ENV};

fn refresh_cookie(refresh_token: String) -> Cookie<'static> {
    Cookie::build("refresh_token", refresh_token)
        .path("/")
        .http_only(true)
        .max_age(time::Duration::seconds(ENV.refresh_token_expiration as i64))
        .finish()
}

/// Loads the authenticated user's profile.
pub async fn current_user(
    user_service: &UserService,
    req: &HttpRequest,
) -> Result<model::UserResponse, error::Error> {
    let id = get_claims(req)?.sub;
    Ok(user_service.get_by_id(id).await?)
}

#[get("/me")]
pub async fn get_profile(
    user_service: web::Data<UserService>,
    req: HttpRequest,
) -> Result<success::Success<model::UserResponse>, error::Error> {
    let user = current_user(&user_service, &req).await?;
    Ok(success::Success::ok(Some(user)).message("Profile retrieved successfully"))
}

#[patch("/me/password")]
pub async fn change_password(
    user_service: web::Data<UserService>,
    req: HttpRequest,
    body: ValidatedJson<model::ChangePasswordModel>,
) -> Result<success::Success<()>, error::Error> {
    let id = get_claims(&req)?.sub;
    user_service.change_password(id, body.0).await?;
    Ok(success::Success::ok(None).message("Password changed successfully"))
}

#[get("")]
pub async fn list_users(
    user_service: web::Data<UserService>,
    req: HttpRequest,
    query: ValidatedQuery<model::UserQuery>,
) -> Result<success::Success<Vec<model::UserResponse>>, error::Error> {
    let actor = current_user(&user_service, &req).await?;
    let users = user_service.list(&actor, query.0).await?;
    Ok(success::Success::ok(Some(users)).message("Users retrieved successfully"))
}

#[post("")]
pub async fn create_user(
    user_service: web::Data<UserService>,
    req: HttpRequest,
    body: ValidatedJson<model::CreateUserModel>,
) -> Result<success::Success<SignUpResponse>, error::Error> {
    let actor = current_user(&user_service, &req).await?;
    let id = user_service.create_user(&actor, body.0).await?;
    Ok(success::Success::created(Some(SignUpResponse { id })).message("User created successfully"))
}

#[patch("/{id:[0-9a-fA-F-]{36}}/permissions")]
pub async fn update_permissions(
    user_service: web::Data<UserService>,
    req: HttpRequest,
    user_id: web::Path<Uuid>,
    body: ValidatedJson<model::UpdatePermissionsModel>,
) -> Result<success::Success<model::UserResponse>, error::Error> {
    let actor = current_user(&user_service, &req).await?;
    let user = user_service.update_permissions(&actor, user_id.into_inner(), body.0).await?;
    Ok(success::Success::ok(Some(user)).message("Permissions updated successfully"))
}

#[post("/signup")]
pub async fn sign_up(
    user_service: web::Data<UserService>,
    user_data: ValidatedJson<model::SignUpModel>,
) -> Result<success::Success<SignUpResponse>, error::Error> {
    let user_id = user_service.sign_up(user_data.0).await?;
    Ok(success::Success::created(Some(SignUpResponse { id: user_id })).message("Signup successful"))
}

#[post("/signin")]
pub async fn sign_in(
    user_service: web::Data<UserService>,
    user_data: ValidatedJson<model::SignInModel>,
) -> Result<success::Success<model::SignInResponse>, error::Error> {
    let (access_token, refresh_token) = user_service.sign_in(user_data.0).await?;
    let response = model::SignInResponse { access_token };

    Ok(success::Success::ok(Some(response))
        .message("Signin successful")
        .cookies(vec![refresh_cookie(refresh_token)]))
}

#[get("/signout")]
pub async fn sign_out(
    user_service: web::Data<UserService>,
    req: HttpRequest,
) -> Result<success::Success<()>, error::Error> {
    let refresh_token = req.cookie("refresh_token").map(|c| c.value().to_string());
    user_service.sign_out(refresh_token).await?;
    let cleared = Cookie::build("refresh_token", "")
        .path("/")
        .http_only(true)
        .max_age(time::Duration::seconds(0))
        .expires(time::OffsetDateTime::UNIX_EPOCH)
        .finish();

    Ok(success::Success::no_content().cookies(vec![cleared]))
}

#[post("/refresh")]
pub async fn refresh(
    user_service: web::Data<UserService>,
    req: HttpRequest,
) -> Result<success::Success<model::SignInResponse>, error::Error> {
    let refresh_token = req.cookie("refresh_token").map(|c| c.value().to_string());
    let (access_token, refresh_token) = user_service.refresh(refresh_token).await?;
    let response = model::SignInResponse { access_token };
    Ok(success::Success::ok(Some(response))
        .message("Refresh successful")
        .cookies(vec![refresh_cookie(refresh_token)]))
}
