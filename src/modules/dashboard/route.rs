use crate::modules::dashboard::handle::*;
use actix_web::web::{scope, ServiceConfig};

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(scope("/dashboard").service(get_dashboard));
}
