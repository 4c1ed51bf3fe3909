// =============================================================================
// Marketscope — Main Entry Point
// =============================================================================
//
// Backend for the stock-analysis dashboard: serves historical prices,
// technical indicators, trading signals, company metrics, and options-chain
// aggregates over a small JSON REST API. All state is a config snapshot and
// an HTTP client; every request is an independent fetch-and-compute cycle.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod analysis;
mod api;
mod config;
mod indicators;
mod market_data;
mod options;
mod types;
mod yahoo;

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::api::rest::AppState;
use crate::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Marketscope backend starting up");

    let config_path = std::env::var("MARKETSCOPE_CONFIG")
        .unwrap_or_else(|_| "marketscope.json".to_string());
    let mut config = AppConfig::load(&config_path).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });

    // Override the bind address from env if available.
    if let Ok(addr) = std::env::var("MARKETSCOPE_BIND_ADDR") {
        config.bind_addr = addr;
    }

    info!(
        bind_addr = %config.bind_addr,
        provider = %config.provider_base_url,
        default_period = %config.default_period,
        "Configuration resolved"
    );

    // ── 2. Shared state & router ─────────────────────────────────────────
    let state = Arc::new(AppState::new(config));
    let app = api::rest::router(state.clone());

    // ── 3. Serve until shutdown ──────────────────────────────────────────
    let listener = tokio::net::TcpListener::bind(&state.config.bind_addr)
        .await
        .with_context(|| format!("failed to bind API server to {}", state.config.bind_addr))?;
    info!(addr = %state.config.bind_addr, "API server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            warn!("Shutdown signal received — stopping gracefully");
        })
        .await?;

    info!("Marketscope backend shut down complete.");
    Ok(())
}
