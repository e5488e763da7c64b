//! Schema initialization binary.
//!
//! Connects to the database named by `DATABASE_URL` and creates the tables
//! from the entity definitions. The serving layer (HTTP or otherwise) lives
//! outside this crate and talks to the library API.

use dotenvy::dotenv;
use fintrack_core::config::database;
use fintrack_core::errors::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Env vars may also be set externally; a missing .env is fine
    dotenv().ok();

    let url = database::get_database_url();
    let db = database::create_connection().await?;
    info!(%url, "connected to database");

    database::create_tables(&db).await?;
    info!("schema ready");

    Ok(())
}
