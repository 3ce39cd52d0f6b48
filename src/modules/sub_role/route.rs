use actix_web::{
    middleware::from_fn,
    web::{scope, ServiceConfig},
};

use crate::{
    middlewares::authorization,
    modules::{sub_role::handle::*, user::schema::UserRole},
};

pub fn public_api_configure(cfg: &mut ServiceConfig) {
    cfg.service(scope("/sub-roles").service(list_sub_roles));
}

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/admin/sub-roles")
            .wrap(from_fn(authorization(vec![UserRole::Admin, UserRole::SuperAdmin])))
            .service(create_sub_role)
            .service(delete_sub_role),
    );
}
