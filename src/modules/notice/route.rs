use crate::modules::notice::{handle::*, schema::NoticeKind};
use actix_web::web::{scope, Data, ServiceConfig};

fn notice_scope(path: &str, kind: NoticeKind) -> actix_web::Scope {
    scope(path)
        .app_data(Data::new(kind))
        .service(list_sent)
        .service(publish_notice)
        .service(list_notices)
        .service(download_attachment)
        .service(get_notice)
        .service(delete_notice)
}

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(notice_scope("/announcements", NoticeKind::Announcement))
        .service(notice_scope("/circulars", NoticeKind::Circular))
        .service(notice_scope("/materials", NoticeKind::Material))
        .service(notice_scope("/pdfs", NoticeKind::Pdf));
}
