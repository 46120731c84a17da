mod cors;

use std::sync::Arc;

use actix_web::{
    App, HttpServer,
    web::{self},
};
use api_kpis::{BillingSource, StripeSource};
use common::env_config::Config;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // get env vars
    let config = Config::from_env();
    let config_data = config.clone();
    let origin = config.cors_allowed_origin.clone();

    // init logger
    logger::setup(&config.log_file, config.console_logging_enabled)
        .map_err(|e| std::io::Error::other(format!("Failed to set up logger: {}", e)))?;

    if config.stripe_secret_key.is_empty() {
        log::warn!("STRIPE_SECRET_KEY is not set, KPI requests will fail until it is configured");
    }

    // billing source shared by all workers
    let source: Arc<dyn BillingSource> = Arc::new(StripeSource::new(&config.stripe_secret_key));

    log::info!(
        "Starting KPI server ({}) on {}:{} with {} workers",
        config.environment,
        config.server_host,
        config.server_port,
        config.num_workers
    );

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(config_data.clone()))
            .app_data(web::Data::new(source.clone()))
            .wrap(logger::middleware()) // 2nd
            .wrap(cors::middleware(&origin)) // 1st
            .service(web::scope("/api").service(api_kpis::mount_kpis()))
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .workers(config.num_workers)
    .run()
    .await
}
