//! CLI subcommand implementations.

pub mod customer;
pub mod migrate;

use secrecy::SecretString;
use sqlx::PgPool;

use broker_portal::db::create_pool;

/// Errors shared by every command that talks to the database.
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    /// Neither `PORTAL_DATABASE_URL` nor `DATABASE_URL` is set.
    #[error("Missing environment variable: PORTAL_DATABASE_URL")]
    MissingDatabaseUrl,

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Connect to the portal database named by the environment.
pub async fn connect() -> Result<PgPool, ConnectError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("PORTAL_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| ConnectError::MissingDatabaseUrl)?;

    tracing::info!("Connecting to portal database...");
    Ok(create_pool(&database_url).await?)
}
