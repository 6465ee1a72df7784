use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{fmt, EnvFilter};

use travel_planner::{router, AppState, Config, OpenAiClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Init tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    let config = Config::from_env();
    match &config.api_key {
        Some(key) => tracing::info!("Using API key: {}...", &key[..key.char_indices().nth(6).map_or(key.len(), |(i, _)| i)]),
        None => tracing::warn!("OPENAI_API_KEY is not set; itinerary generation will fail"),
    }
    tracing::info!(
        model = %config.model,
        timeout_secs = config.timeout.as_secs(),
        max_retries = config.max_retries,
        "Itinerary generator configured"
    );

    let client = OpenAiClient::new(&config).context("failed to create itinerary client")?;
    let state = AppState::new(Arc::new(client));
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!(%addr, "Starting server");
    let listener = tokio::net::TcpListener::bind(addr).await.with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutting down");
}
