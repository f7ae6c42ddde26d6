//! JSON HTTP API over the stored sources and the unified dataset.

pub mod handlers;
pub mod models;

use actix_web::{web, App, HttpServer};
use anyhow::Result;
use tracing::{error, info, instrument};

use crate::config::AppConfig;
use crate::storage::DataStore;
use handlers::{
    analysis_handler, compare_bootstrap_handler, compare_tld_list_handler, health_check,
    managers_handler, tld_handler, tlds_handler,
};
use models::AppState;

/// Registers every API route
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/health").route(web::get().to(health_check)))
        .service(web::resource("/api/analysis").route(web::get().to(analysis_handler)))
        .service(web::resource("/api/compare/bootstrap").route(web::get().to(compare_bootstrap_handler)))
        .service(web::resource("/api/compare/tld-list").route(web::get().to(compare_tld_list_handler)))
        .service(web::resource("/api/tlds").route(web::get().to(tlds_handler)))
        .service(web::resource("/api/tlds/{tld}").route(web::get().to(tld_handler)))
        .service(web::resource("/api/managers").route(web::get().to(managers_handler)));
}

/// Starts the API server and runs until it is shut down
///
/// # Arguments
/// * `config` - Application configuration (data directory, bind address)
/// * `host` - Host address to bind to (e.g., "127.0.0.1")
/// * `port` - Port to listen on
#[instrument(skip(config))]
pub async fn start_server(config: &AppConfig, host: &str, port: u16) -> Result<()> {
    info!("Starting TLD API server on {}:{}", host, port);

    let state = web::Data::new(AppState::new(
        DataStore::new(&config.data_dir),
        config.supplemental_path.clone(),
    ));

    HttpServer::new(move || App::new().app_data(state.clone()).configure(routes))
        .bind((host, port))
        .map_err(|e| {
            error!("Failed to bind to {}:{}: {}", host, port, e);
            e
        })?
        .run()
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
