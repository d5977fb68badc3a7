use std::path::PathBuf;

use anyhow::{Context, Result};
use dotenv::dotenv;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use hashimom_data::repository::{Backend, ReferenceRangeRepository, ReferenceRangeRepositoryTrait};
use hashimom_domain::database;
use hashimom_domain::health::{get_system_health, SystemStatus};

/// Seeds the trimester reference ranges into the SQLite database
///
/// 1. Loads environment variables from .env
/// 2. Sets up tracing
/// 3. Derives DB_SQLITE_PATH from DATA_DIR when it is not set
/// 4. Opens the pool and upserts the seed table
/// 5. Logs system health
#[tokio::main]
async fn main() -> Result<()> {
    if dotenv().is_err() {
        eprintln!("Warning: .env file not found or couldn't be read. Using environment variables.");
    }

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stdout))
        .with(env_filter)
        .init();

    info!("Seeding HashiMom reference ranges");

    if std::env::var("DB_SQLITE_PATH").is_err() {
        let data_dir = std::env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string());
        let db_path = PathBuf::from(&data_dir).join("hashimom.db");
        std::fs::create_dir_all(&data_dir).with_context(|| format!("creating data directory {}", data_dir))?;
        std::env::set_var("DB_SQLITE_PATH", &db_path);
        info!("Set DB_SQLITE_PATH to {}", db_path.display());
    }

    let pool = database::initialize_database_pool().context("initializing database pool")?;
    if pool.is_in_memory() {
        warn!("Database file could not be opened; seeding an in-memory database that will not persist");
    }

    let ranges = ReferenceRangeRepository::with_backend(Backend::Database(pool));
    let seeded = ranges.seed_defaults().await.context("seeding reference ranges")?;
    let total = ranges.count().await.context("counting reference ranges")?;
    info!("Upserted {} reference ranges ({} stored)", seeded, total);

    let health = get_system_health(&ranges).await;
    for (name, component) in &health.components {
        info!(
            "{}: {:?}{}",
            name,
            component.status,
            component.details.as_deref().map(|d| format!(" ({})", d)).unwrap_or_default()
        );
    }

    if health.status == SystemStatus::Healthy {
        info!("System healthy");
    } else {
        warn!("System status: {:?}", health.status);
    }

    Ok(())
}
