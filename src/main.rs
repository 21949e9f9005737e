use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use dotenvy::dotenv;

mod api;
mod attendance;
mod auth;
mod config;
mod db;
mod docs;
mod model;
mod models;
mod routes;
mod utils;

use config::Config;
use db::init_db;

use crate::attendance::gateway::live_gateway;
use crate::docs::ApiDoc;
use crate::utils::serial_cache;
use crate::utils::serial_filter;
use tracing::info;
use tracing_appender::rolling;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[get("/")]
async fn index() -> impl Responder {
    "Attendance Tracking System"
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    let config = Config::from_env();

    // Rolling daily log
    let file_appender = rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!("Server starting...");

    let pool = init_db(&config.database_url).await;

    let pool_for_filter_warmup = pool.clone();
    let pool_for_cache_warmup = pool.clone();
    let server_addr = config.server_addr.clone();
    let config_data = config.clone();
    let enforce_device_consistency = config.enforce_device_consistency;

    actix_web::rt::spawn(async move {
        if let Err(e) = serial_filter::warmup_serial_filter(&pool_for_filter_warmup, 100).await {
            eprintln!("Failed to warmup serial filter: {:?}", e);
        }
    });

    actix_web::rt::spawn(async move {
        // Warm up pending serials detected in the last 30 days, in batches
        if let Err(e) = serial_cache::warmup_serial_cache(&pool_for_cache_warmup, 30, 250).await {
            eprintln!("Failed to warmup serial cache: {:?}", e);
        }
    });

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(Data::new(pool.clone()))
            .app_data(Data::new(config.clone()))
            .app_data(Data::new(live_gateway(&pool, enforce_device_consistency)))
            .service(index)
            .configure(|cfg| routes::configure(cfg, config_data.clone()))
    })
    .bind(server_addr)?
    .run()
    .await
}
