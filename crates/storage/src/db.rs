use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

use issuescan_core::config::PostgresConfig;

use crate::error::StorageError;

/// Create a PostgreSQL connection pool and run migrations.
pub async fn connect(config: &PostgresConfig) -> Result<PgPool, StorageError> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.connection_string())
        .await?;
    info!("PostgreSQL connected: {}", config.host);

    sqlx::migrate!("../../migrations").run(&pool).await?;
    info!("Database migrations applied successfully");

    Ok(pool)
}
