use crate::modules::timetable::handle::*;
use actix_web::web::{scope, ServiceConfig};

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/timetables")
            .service(list_pinned)
            .service(upload_timetable)
            .service(list_timetables)
            .service(pin_timetable)
            .service(unpin_timetable)
            .service(download_timetable)
            .service(delete_timetable),
    );
}
