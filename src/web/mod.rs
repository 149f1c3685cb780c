pub mod handlers;
pub mod models;
pub mod personality;
pub mod routes;

use actix_web::middleware::DefaultHeaders;

/// CORS headers attached to every response, errors included.
pub fn cors_headers() -> DefaultHeaders {
    DefaultHeaders::new()
        .add(("Access-Control-Allow-Origin", "*"))
        .add(("Access-Control-Allow-Methods", "GET,POST,OPTIONS"))
        .add(("Access-Control-Allow-Headers", "Content-Type, Authorization"))
}
