//! # clearance-api: Binary Entry Point
//!
//! Starts the Axum HTTP server for the valuation engine.
//! Binds to `PORT` (default 8080).

use clearance_api::state::{AppConfig, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env().map_err(|e| {
        tracing::error!("Invalid environment: {e}");
        e
    })?;

    // CLEARANCE_CONFIG / CLEARANCE_TARIFFS; a bad file stops startup.
    let state = AppState::load(&config).map_err(|e| {
        tracing::error!("Failed to load valuation state: {e}");
        e
    })?;

    let app = clearance_api::app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Clearance API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
