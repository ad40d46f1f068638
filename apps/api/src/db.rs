use anyhow::{Context, Result};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use tracing::{error, info};

use crate::config::DatabaseConfig;

/// Builds the PostgreSQL pool. Connections are opened on first use, so an
/// unreachable database fails individual requests instead of startup.
pub fn create_pool(config: &DatabaseConfig) -> PgPool {
    info!(
        host = %config.host,
        port = config.port,
        database = %config.name,
        max_connections = config.max_connections,
        "Configuring PostgreSQL pool"
    );

    let options = PgConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .database(&config.name)
        .username(&config.user)
        .password(&config.password);

    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect_lazy_with(options)
}

/// Applies the bundled schema migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("Failed to apply database migrations")?;
    info!("Database schema is up to date");
    Ok(())
}

/// Startup variant of `run_migrations`: a failure is logged and serving goes on,
/// so an unreachable database surfaces per request instead of stopping the process.
pub async fn apply_migrations(pool: &PgPool) -> bool {
    match run_migrations(pool).await {
        Ok(()) => true,
        Err(e) => {
            error!("Migrations not applied, continuing without them: {e:#}");
            false
        }
    }
}
