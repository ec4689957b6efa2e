//! CLI subcommands.

pub mod admin;
pub mod migrate;

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use thiserror::Error;

/// Failure to reach the database.
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("Missing environment variable: WISHLISTED_DATABASE_URL (or DATABASE_URL)")]
    MissingEnvVar,

    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Connect using the same variables as the server.
pub async fn connect() -> Result<PgPool, ConnectError> {
    dotenvy::dotenv().ok();

    let url = std::env::var("WISHLISTED_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| ConnectError::MissingEnvVar)?;

    tracing::info!("Connecting to database...");
    Ok(PgPool::connect(url.expose_secret()).await?)
}
