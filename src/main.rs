mod command;
mod config;
mod dispatch;
mod event;
mod fallback;
mod providers;
mod router;
mod sender;
mod transcript;
mod webhook;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::router::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,zalogate=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.toml"));

    info!("Loading configuration from: {}", config_path.display());
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    if config.webhook_secret.is_empty() {
        warn!("No webhook secret configured; every webhook call will be rejected");
    }

    info!("Configuration loaded successfully");
    info!("  Bind address: {}", config.server.bind);
    info!("  Relay: {}", config.relay.base_url);
    info!("  Configured providers: {:?}", config.configured_provider_names());
    info!("  Fallback order: {:?}", config.fallback.order);
    info!("  Max in-flight dispatches: {}", config.dispatch.max_in_flight);

    let bind = config.server.bind.clone();
    let admin_id = config.admin_id.clone();
    let state = Arc::new(AppState::new(config));

    // Tell the admin the gateway is up (best-effort).
    if let Some(admin_id) = admin_id {
        let notice = format!(
            "Bot online at {}. Ready to relay messages.",
            chrono::Local::now().format("%H:%M:%S")
        );
        if state.sender.send_text(&admin_id, &notice).await {
            info!("Startup notice sent to admin {}", admin_id);
        } else {
            warn!("Could not deliver startup notice to admin {}", admin_id);
        }
    }

    let app = webhook::router(state);

    info!("Gateway is starting on {}...", bind);
    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;
    axum::serve(listener, app)
        .await
        .context("HTTP server exited with an error")?;

    Ok(())
}
