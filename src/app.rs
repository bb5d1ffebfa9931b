use std::error::Error;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::infrastructure::config::AppConfig;
use crate::infrastructure::db::connection::init_db;
use crate::infrastructure::db::maintenance::{clear_all, ClearReport};

/// `RUST_LOG` wins; otherwise `info`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

pub async fn run() -> Result<(), Box<dyn Error>> {
    init_tracing();

    let config = AppConfig::load().map_err(|err| {
        error!(error = %err, "Invalid configuration");
        err
    })?;

    let (pool, state) = crate::infrastructure::bootstrap::setup(&config).await?;
    let server = crate::interfaces::http::start_server(state, &config.server)?;
    server.await?;

    pool.close().await;
    info!("Server stopped");
    Ok(())
}

/// Empties every table of the configured database.
pub async fn clear_database() -> Result<ClearReport, Box<dyn Error>> {
    init_tracing();

    let config = AppConfig::load()?;
    let pool = init_db(&config.database).await?;
    let report = clear_all(&pool).await?;
    pool.close().await;

    info!(
        ratings = report.ratings,
        syllabi = report.syllabi,
        courses = report.courses,
        professors = report.professors,
        schools = report.schools,
        users = report.users,
        "Database cleared"
    );
    Ok(report)
}
