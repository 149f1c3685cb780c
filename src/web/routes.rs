use actix_web::http::Method;
use actix_web::web;

use crate::web::handlers;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource(handlers::ENDPOINT)
            .route(web::get().to(handlers::status))
            .route(web::post().to(handlers::talk))
            .route(web::method(Method::OPTIONS).to(handlers::preflight))
            .default_service(web::to(handlers::method_not_allowed)),
    );
}
