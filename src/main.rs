use std::sync::Arc;

use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use anyhow::Context;

mod api;
mod auth;
mod config;
mod db;
mod docs;
mod error;
mod model;
mod models;
mod routes;
mod service;
mod store;
mod utils;

#[cfg(test)]
mod test_support;

use config::Config;
use db::{ensure_schema, init_db};
use routes::RateLimiters;
use service::{AttendanceService, AuthService};
use store::{
    AccountStore, AttendanceStore, InMemoryAccountStore, InMemoryAttendanceStore,
    MySqlAccountStore, MySqlAttendanceStore,
};

use crate::docs::ApiDoc;
use tracing::{info, warn};
use tracing_appender::rolling;
use utoipa::OpenApi; // ← needed for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

#[get("/")]
async fn index() -> impl Responder {
    "Hello World!"
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(config.log_level)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!("Server starting...");

    let (attendance_store, account_store): (Arc<dyn AttendanceStore>, Arc<dyn AccountStore>) =
        match &config.database_url {
            Some(url) => {
                let pool = init_db(url).await.context("Failed to connect to database")?;
                ensure_schema(&pool).await.context("Failed to prepare database schema")?;
                (
                    Arc::new(MySqlAttendanceStore::new(pool.clone())),
                    Arc::new(MySqlAccountStore::new(pool)),
                )
            }
            None => {
                warn!("DATABASE_URL not set, data lives in memory and is lost on restart");
                (
                    Arc::new(InMemoryAttendanceStore::new()),
                    Arc::new(InMemoryAccountStore::new()),
                )
            }
        };

    let attendance = Data::new(AttendanceService::new(attendance_store, config.business_offset));
    let auth = Data::new(AuthService::new(account_store, &config));
    let limiters = RateLimiters::from_config(&config)?;

    let server_addr = config.server_addr.clone();
    let config = Data::new(config);

    info!(addr = %server_addr, prefix = %config.api_prefix, "Listening");

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← important: wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(config.clone())
            .app_data(attendance.clone())
            .app_data(auth.clone())
            .service(index)
            // auth + attendance routes with rate limiting
            .configure(|cfg| routes::configure(cfg, &config, &limiters))
    })
    .bind(&server_addr)
    .with_context(|| format!("Failed to bind {server_addr}"))?
    .run()
    .await?;

    Ok(())
}
