use crate::modules::drive::handle::*;
use actix_web::web::{scope, ServiceConfig};

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/drive")
            .service(list_items)
            .service(search_items)
            .service(create_folder)
            .service(upload_files)
            .service(get_path)
            .service(download_item)
            .service(get_item)
            .service(rename_item)
            .service(move_item)
            .service(copy_item)
            .service(delete_item),
    );
}
