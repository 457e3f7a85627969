mod api;
mod auth;
mod classifier;
mod config;
mod database;
mod errors;
mod executor;
mod judge;
mod models;
mod stats;
mod templates;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware, App, HttpServer};
use api::{configure_routes, AppState};
use executor::HttpExecutionClient;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("Warning: could not load .env file: {}", e);
    }

    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let app_config = config::AppConfig::from_env().unwrap_or_else(|e| {
        eprintln!("{}", e);
        std::process::exit(1);
    });

    let pool = database::init_db().await.unwrap_or_else(|e| {
        eprintln!("Failed to initialize database: {}", e);
        std::process::exit(1);
    });

    let executor = Arc::new(HttpExecutionClient::new(
        reqwest::Client::new(),
        app_config.executor.clone(),
    ));

    let bind_addr = app_config.bind_addr.clone();
    let state = AppState::new(app_config, pool, executor);

    log::info!("judging engine listening on {}", bind_addr);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(actix_web::web::Data::new(state.clone()))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .configure(configure_routes)
    })
    .bind(bind_addr)?
    .run()
    .await
}
