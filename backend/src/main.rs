mod bulk;
mod config;
mod error;
mod job_controller;
mod media;
mod render;
mod services;
mod session;
mod storage;

use crate::config::AppConfig;
use crate::job_controller::state::JobsState;
use crate::session::SessionState;
use crate::storage::CardRepository;
use actix_web::{web, App, HttpServer};
use env_logger::Env;
use log::info;
use tokio::sync::mpsc;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(Env::default().default_filter_or("info"));
    let config = AppConfig::from_env();

    let repository = CardRepository::open(&config.database_path, config.asset_dir.clone())
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    let repository = web::Data::new(repository);

    // Initialize job controller state
    let (tx, rx) = mpsc::channel(100);
    let jobs_state = JobsState::new(tx);

    // Start job updater task
    let updater_state = jobs_state.clone();
    tokio::spawn(async move {
        job_controller::state::start_job_updater(updater_state, rx).await;
    });

    let session = SessionState::new();
    let bind = (config.host.clone(), config.port);
    let json_limit = config.max_upload_bytes;
    let config = web::Data::new(config);

    info!("Server running at http://{}:{}", bind.0, bind.1);

    HttpServer::new(move || {
        App::new()
            .app_data(web::JsonConfig::default().limit(json_limit))
            .app_data(web::Data::new(jobs_state.clone()))
            .app_data(web::Data::new(session.clone()))
            .app_data(config.clone())
            .app_data(repository.clone())
            .service(services::data_sources::configure_routes())
            .service(services::records::configure_routes())
            .service(services::design::configure_routes())
            .service(services::merge::configure_routes())
            .service(services::cards::configure_routes())
            .service(services::cards::configure_assets())
    })
    .bind(bind)?
    .run()
    .await
}
