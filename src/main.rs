mod config;
mod error;
mod model;
mod web;

use actix_web::middleware::Logger;
use actix_web::{web::Data, App, HttpServer};
use anyhow::Context;
use dotenv::dotenv;
use log::{info, warn};

use config::Config;
use model::CompletionClient;
use web::routes;

// App state structure, shared read-only by every worker
struct AppState {
    config: Config,
    client: CompletionClient,
}

impl AppState {
    fn new(config: Config) -> Self {
        let client = CompletionClient::new(config.api_url.clone());
        Self { config, client }
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Initialize environment
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    info!("Starting talk proxy");

    let config = Config::from_env().context("Failed to read configuration")?;
    if config.api_key.is_none() {
        warn!("OPENAI_API_KEY is not set; POST requests will fail until it is");
    }

    let bind_addr = (config.host.clone(), config.port);
    let app_state = Data::new(AppState::new(config));

    info!("Listening on http://{}:{}", bind_addr.0, bind_addr.1);

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(web::cors_headers())
            .wrap(Logger::default())
            .configure(routes::configure)
    })
    .bind(&bind_addr)
    .with_context(|| format!("Failed to bind {}:{}", bind_addr.0, bind_addr.1))?
    .run()
    .await
    .context("Server error")
}
