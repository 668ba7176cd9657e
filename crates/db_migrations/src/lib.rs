//! Postgres schema for documents, chunks, sessions and messages.
use anyhow::{Context, Result};
use std::time::Duration;
use tokio_postgres::NoTls;
use tracing::info;

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("./migrations");
}

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Applies any pending migrations and returns how many were applied.
pub async fn run_migrations(database_url: &str) -> Result<usize> {
    info!("Running database migrations...");

    let (mut client, connection) =
        tokio::time::timeout(CONNECT_TIMEOUT, tokio_postgres::connect(database_url, NoTls))
            .await
            .context("Database connection timed out")?
            .context("Failed to connect to database")?;

    tokio::spawn(async move {
        if let Err(e) = connection.await {
            tracing::error!(error = %e, "Migration connection error");
        }
    });

    let report = embedded::migrations::runner()
        .run_async(&mut client)
        .await
        .context("Failed to run migrations")?;

    let applied = report.applied_migrations();
    for migration in applied {
        info!(
            version = migration.version(),
            name = migration.name(),
            "Applied migration"
        );
    }

    Ok(applied.len())
}
