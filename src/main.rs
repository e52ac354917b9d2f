use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use dotenvy::dotenv;

mod api;
mod auth;
mod config;
mod docs;
mod error;
mod model;
mod models;
mod routes;
mod storage;
mod store;
mod utils;

use config::Config;
use storage::FileStorage;
use store::Stores;

use crate::docs::ApiDoc;
use crate::utils::email_cache;
use crate::utils::email_filter;
use chrono::Utc;
use std::sync::Arc;
use tracing::info;
use tracing_appender::rolling;
use utoipa::OpenApi; // ← needed for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

#[get("/")]
async fn index() -> impl Responder {
    "Employee Management System"
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
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!("Server starting...");

    let stores = Stores::new(Arc::new(FileStorage::new(&config.data_dir)));

    if stores
        .identity
        .ensure_default_admin(&config.seed_admin_password, &config.default_company, Utc::now())
        .map_err(std::io::Error::other)?
    {
        info!("Seeded default administrator account");
    }

    let stores_for_filter_warmup = stores.clone();
    let stores_for_cache_warmup = stores.clone();
    // 👇 clone what you need BEFORE moving config
    let server_addr = config.server_addr.clone();
    let config_data = config.clone();

    actix_web::rt::spawn(async move {
        if let Err(e) =
            email_filter::warmup_email_filter(&stores_for_filter_warmup.identity, 100).await
        {
            eprintln!("Failed to warmup email filter: {:?}", e);
        }
    });

    actix_web::rt::spawn(async move {
        if let Err(e) =
            email_cache::warmup_email_cache(&stores_for_cache_warmup.identity, 250).await
        {
            eprintln!("Failed to warmup email cache: {:?}", e);
        }
    });

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← important: wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(Data::new(stores.clone()))
            .app_data(Data::new(config.clone()))
            .service(index)
            // Configure auth + protected routes with rate limiting
            .configure(|cfg| routes::configure(cfg, config_data.clone()))
    })
    .bind(server_addr)?
    .run()
    .await
}
