use actix_cors::Cors;
use actix_web::{
    self, http::header, middleware::{from_fn, Logger}, web, App, HttpServer,
};
use std::sync::{Arc, LazyLock};

use crate::{
    configs::{connect_database, RedisCache},
    middlewares::authentication,
    modules::{
        achievement::{repository_pg::AchievementRepositoryPg, service::AchievementService},
        dashboard::service::DashboardService,
        drive::{repository_pg::DriveRepositoryPg, service::DriveService},
        file::{
            model::UploadConfig, repository_pg::FilePgRepository, service::FileService,
            storage::LocalDiskStorage,
        },
        notice::{repository_pg::NoticeRepositoryPg, service::NoticeService},
        sub_role::{repository_pg::SubRoleRepositoryPg, service::SubRoleService},
        timetable::{repository_pg::TimetableRepositoryPg, service::TimetableService},
        user::{repository_pg::UserRepositoryPg, service::UserService},
        workshop::{repository_pg::WorkshopRepositoryPg, service::WorkshopService},
    },
};

mod api;
mod configs;
mod constants;
mod middlewares;
mod modules;
#[cfg(test)]
mod test;
mod utils;

pub static ENV: LazyLock<constants::Env> = LazyLock::new(|| {
    dotenvy::dotenv().ok();
    env_logger::init();
    log::info!("Environment variables loaded from .env file");
    constants::Env::default()
});

#[actix_web::get("/")]
async fn health_check(db_pool: web::Data<sqlx::PgPool>) -> &'static str {
    match sqlx::query("SELECT 1").execute(db_pool.get_ref()).await {
        Ok(_) => "Server is running",
        Err(e) => {
            log::warn!("Health check could not reach the database: {}", e);
            "Server is running, database unreachable"
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let db_pool =
        connect_database().await.map_err(|_| std::io::Error::other("Database connection error"))?;

    let redis_pool =
        RedisCache::new().await.map_err(|_| std::io::Error::other("Redis connection error"))?;

    let storage = Arc::new(LocalDiskStorage::new(&ENV.upload_dir));
    let file_service = FileService::new(
        Arc::new(FilePgRepository::new(db_pool.clone())),
        storage,
        UploadConfig::with_max_size(ENV.max_upload_size),
    );

    let sub_role_service =
        SubRoleService::with_dependencies(Arc::new(SubRoleRepositoryPg::new(db_pool.clone())));
    let user_service = UserService::with_dependencies(
        Arc::new(UserRepositoryPg::new(db_pool.clone())),
        sub_role_service.clone(),
        Arc::new(redis_pool),
    );
    let drive_service = DriveService::with_dependencies(
        Arc::new(DriveRepositoryPg::new(db_pool.clone())),
        file_service.clone(),
    );
    let notice_service = NoticeService::with_dependencies(
        Arc::new(NoticeRepositoryPg::new(db_pool.clone())),
        file_service.clone(),
    );
    let timetable_service = TimetableService::with_dependencies(
        Arc::new(TimetableRepositoryPg::new(db_pool.clone())),
        file_service.clone(),
        sub_role_service.clone(),
    );
    let achievement_service = AchievementService::with_dependencies(
        Arc::new(AchievementRepositoryPg::new(db_pool.clone())),
        file_service.clone(),
        sub_role_service.clone(),
    );
    let workshop_service = WorkshopService::with_dependencies(
        Arc::new(WorkshopRepositoryPg::new(db_pool.clone())),
        sub_role_service.clone(),
    );
    let dashboard_service = DashboardService::with_dependencies(
        notice_service.clone(),
        timetable_service.clone(),
        achievement_service.clone(),
    );

    log::info!("Starting server at http://{}:{}", ENV.ip.as_str(), ENV.port);
    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&ENV.frontend_url)
            .allowed_methods(vec!["GET", "POST", "PATCH", "DELETE", "OPTIONS"])
            .allowed_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .app_data(web::Data::new(user_service.clone()))
            .app_data(web::Data::new(sub_role_service.clone()))
            .app_data(web::Data::new(drive_service.clone()))
            .app_data(web::Data::new(notice_service.clone()))
            .app_data(web::Data::new(timetable_service.clone()))
            .app_data(web::Data::new(achievement_service.clone()))
            .app_data(web::Data::new(workshop_service.clone()))
            .app_data(web::Data::new(dashboard_service.clone()))
            .app_data(web::Data::new(db_pool.clone()))
            .service(health_check)
            .service(
                web::scope("/api")
                    .configure(modules::user::route::public_api_configure)
                    .configure(modules::sub_role::route::public_api_configure)
                    .service(
                        web::scope("")
                            .wrap(from_fn(authentication))
                            .configure(modules::user::route::configure)
                            .configure(modules::sub_role::route::configure)
                            .configure(modules::drive::route::configure)
                            .configure(modules::notice::route::configure)
                            .configure(modules::timetable::route::configure)
                            .configure(modules::achievement::route::configure)
                            .configure(modules::workshop::route::configure)
                            .configure(modules::dashboard::route::configure),
                    ),
            )
    })
    .bind((ENV.ip.as_str(), ENV.port))?
    .workers(2)
    .run()
    .await
}
