use anyhow::Context;
use chat_core::Config;
use server::{create_app, telemetry, ChatService};
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (config, load_error) = match Config::load_from_env() {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };
    let config = config.with_env_overrides();

    telemetry::init_tracing(&config.logging);

    if let Some(e) = load_error {
        warn!(error = %e, "Could not load config, using development defaults");
    }

    info!("Starting PDF chat server");

    let store = store::connect(&config.database.url)
        .await
        .context("Failed to initialize store")?;
    let service = Arc::new(ChatService::new(&config, store));

    let app = create_app(service, &config.server);

    let address = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind to {}", address))?;

    info!(address = %address, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
