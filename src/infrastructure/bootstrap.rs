use std::error::Error;

use actix_web::web;
use sqlx::SqlitePool;
use tracing::{error, info};

use crate::infrastructure::config::AppConfig;
use crate::infrastructure::db::connection::init_db;
use crate::infrastructure::mail::build_mailer;
use crate::infrastructure::security::password::PasswordService;
use crate::infrastructure::storage::CloudinaryStorage;
use crate::interfaces::http::HttpState;

/// Opens the database and wires repositories, providers and use cases.
pub async fn setup(
    config: &AppConfig,
) -> Result<(SqlitePool, web::Data<HttpState>), Box<dyn Error>> {
    let pool = init_db(&config.database).await.map_err(|err| {
        error!(error = %err, url = %config.database.url, "Failed to initialize database");
        err
    })?;

    let storage = CloudinaryStorage::new(&config.storage).map_err(|err| {
        error!(error = %err, "Failed to configure object storage");
        err
    })?;

    let mailer = build_mailer(&config.mail).map_err(|err| {
        error!(error = %err, smtp_host = %config.mail.smtp_host, "Failed to configure mailer");
        err
    })?;
    if config.mail.smtp_host.trim().is_empty() {
        info!("SMTP host not set, password reset links will only be logged");
    }

    let state = HttpState::build(
        pool.clone(),
        config,
        std::sync::Arc::new(storage),
        mailer,
        PasswordService::default(),
    );

    Ok((pool, web::Data::new(state)))
}
