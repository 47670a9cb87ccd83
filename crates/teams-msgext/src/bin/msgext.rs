//! Messaging extension binary.
//!
//! Standalone HTTP service for the Teams bot messaging endpoint.

use anyhow::{Context, Result};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use teams_msgext::{config::Config, server};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("teams_msgext=info".parse()?))
        .init();

    info!("Starting messaging extension service...");

    let config = Config::default();

    if config.app_id.is_empty() || config.app_password.is_empty() {
        warn!("MicrosoftAppId/MicrosoftAppPassword not set - token service calls will fail");
    }
    if config.connection_name.is_empty() {
        warn!("ConnectionName not set - sign-in will fail");
    }

    let port = config.port;
    let state = server::AppState::from_config(config).context("Failed to build app state")?;
    let app = server::build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    info!(%addr, "Messaging extension listening on /api/messages");

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
