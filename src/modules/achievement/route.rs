use crate::modules::achievement::handle::*;
use actix_web::web::{scope, ServiceConfig};

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/achievements")
            .service(list_mine)
            .service(submit_achievement)
            .service(list_achievements)
            .service(approve_achievement)
            .service(reject_achievement)
            .service(download_proof)
            .service(delete_achievement),
    );
}
