use actix_web::{get, web, HttpRequest};

use crate::{
    api::{error, success},
    modules::{
        dashboard::service::{DashboardResponse, DashboardService},
        user::{handle::current_user, service::UserService},
    },
};

#[get("")]
pub async fn get_dashboard(
    dashboard_service: web::Data<DashboardService>,
    user_service: web::Data<UserService>,
    req: HttpRequest,
) -> Result<success::Success<DashboardResponse>, error::Error> {
    let user = current_user(&user_service, &req).await?;
    let summary = dashboard_service.summary(user).await?;
    Ok(success::Success::ok(Some(summary)))
}
