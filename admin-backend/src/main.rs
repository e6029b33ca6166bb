use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::sync::Arc;
use std::time::Instant;

mod config;
mod controllers;
mod db;
mod stats;

use config::Config;
use db::{CollectionStore, MongoStore};

pub struct AppState {
    pub store: Arc<dyn CollectionStore>,
    pub config: Config,
    pub start_time: Instant,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    };

    // The client connects lazily on the first request
    let store: Arc<dyn CollectionStore> = Arc::new(MongoStore::new(
        config.mongo_uri.clone(),
        config.mongo_db_name.clone(),
    ));
    let start_time = Instant::now();

    let bind = (config.bind_address.clone(), config.port);
    log::info!("GetHeyway Admin Dashboard running on port {}", config.port);
    log::info!("Environment: {}", config.environment);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .app_data(web::Data::new(AppState {
                store: Arc::clone(&store),
                config: config.clone(),
                start_time,
            }))
            .wrap(Logger::default())
            .wrap(cors)
            .configure(controllers::health::config)
            .configure(controllers::collections::config)
            .configure(controllers::dashboard::config)
            .configure(controllers::analytics::config)
            .default_service(web::route().to(controllers::not_found))
    })
    .bind(bind)?
    .run()
    .await
}
