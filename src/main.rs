use std::sync::Arc;

use actix_cors::Cors;
use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use anyhow::Context;
use dotenvy::dotenv;

mod api;
mod attendance;
mod auth;
mod config;
mod db;
mod docs;
mod error;
mod model;
mod models;
mod routes;
mod store;

use attendance::coordinator::{CheckInCoordinator, SystemClock};
use auth::service::AuthService;
use config::Config;
use db::init_db;
use store::{
    AttendanceLedger, UserStore,
    memory::{MemoryAttendanceLedger, MemoryUserStore},
    mysql::{MySqlAttendanceLedger, MySqlUserStore},
};

use crate::docs::ApiDoc;
use tracing::{info, warn};
use tracing_appender::rolling;
use utoipa::OpenApi; // ← needed for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

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

    let (users, ledger): (Arc<dyn UserStore>, Arc<dyn AttendanceLedger>) =
        match &config.database_url {
            Some(url) => {
                let pool = init_db(url).await?;
                info!("Using MySQL storage");
                (
                    Arc::new(MySqlUserStore::new(pool.clone())),
                    Arc::new(MySqlAttendanceLedger::new(pool)),
                )
            }
            None => {
                warn!("DATABASE_URL not set, records live in memory only");
                (
                    Arc::new(MemoryUserStore::new()),
                    Arc::new(MemoryAttendanceLedger::new()),
                )
            }
        };

    let auth = Arc::new(AuthService::new(
        users,
        config.jwt_secret.clone(),
        config.access_token_ttl,
    ));

    match (&config.admin_email, &config.admin_password) {
        (Some(email), Some(password)) => {
            let created = auth
                .bootstrap_admin(email, password, &config.admin_full_name)
                .await
                .context("Failed to seed admin user")?;
            if created {
                info!(email = %email, "Admin user created");
            } else {
                info!(email = %email, "Admin user already present");
            }
        }
        _ => warn!("ADMIN_EMAIL/ADMIN_PASSWORD not set, no admin seeded"),
    }

    let coordinator = Arc::new(CheckInCoordinator::new(
        auth.clone(),
        ledger,
        Arc::new(SystemClock),
    ));

    let server_addr = config.server_addr.clone();
    info!(addr = %server_addr, "Listening");

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .wrap(Cors::permissive())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← important: wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(Data::new(config.clone()))
            .app_data(Data::from(auth.clone()))
            .app_data(Data::from(coordinator.clone()))
            .configure(|cfg| routes::configure(cfg, config.clone()))
    })
    .bind(server_addr)?
    .run()
    .await?;

    Ok(())
}
