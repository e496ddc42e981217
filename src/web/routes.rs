use actix_web::web;
use crate::web::handlers;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/scan", web::post().to(handlers::scan_api))
    )
    .route("/", web::get().to(handlers::index))
    .route("/scan", web::post().to(handlers::scan_page))
    .route("/about", web::get().to(handlers::about))
    .route("/health", web::get().to(handlers::health_check));
}
