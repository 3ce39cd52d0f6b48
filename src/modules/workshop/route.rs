use crate::modules::workshop::handle::*;
use actix_web::web::{scope, ServiceConfig};

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/workshops")
            .service(list_mine)
            .service(create_workshop)
            .service(list_workshops)
            .service(delete_workshop),
    );
}
