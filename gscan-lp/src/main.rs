//! gscan-lp (Lookup Proxy) - barcode → eco-score microservice
//!
//! Forwards a scanned barcode to Open Food Facts and answers with a
//! normalized product record plus a color-coded sustainability rating.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use gscan_lp::config::{CliOverrides, ProxyConfig, ProxyTomlConfig, MODULE_NAME};
use gscan_lp::{build_router, AppState, OpenFoodFactsClient};
use reqwest::Url;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for gscan-lp
#[derive(Parser, Debug)]
#[command(name = "gscan-lp")]
#[command(about = "GreenScan lookup proxy: barcode to eco-score")]
#[command(version)]
struct Args {
    /// TOML config file (default: ~/.config/greenscan/gscan-lp.toml)
    #[arg(short, long, env = "GSCAN_LP_CONFIG")]
    config: Option<PathBuf>,

    /// Address to listen on (env: GSCAN_LP_BIND)
    #[arg(short, long)]
    bind: Option<SocketAddr>,

    /// Product database base URL (env: GSCAN_UPSTREAM_URL)
    #[arg(long)]
    upstream_url: Option<Url>,

    /// Product database request timeout in seconds (env: GSCAN_UPSTREAM_TIMEOUT_SECS)
    #[arg(long)]
    upstream_timeout_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let toml_config: ProxyTomlConfig =
        gscan_common::config::load_toml_config(args.config.as_deref(), MODULE_NAME)
            .context("Failed to load configuration")?;
    let config = ProxyConfig::resolve(
        CliOverrides {
            bind_addr: args.bind,
            upstream_url: args.upstream_url,
            upstream_timeout_secs: args.upstream_timeout_secs,
        },
        toml_config,
    )
    .context("Invalid configuration")?;

    // RUST_LOG wins over the configured level
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting GreenScan Lookup Proxy (gscan-lp) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    info!(
        "Upstream: {} (timeout {:?})",
        config.upstream.base_url, config.upstream.timeout
    );

    let client = OpenFoodFactsClient::new(&config.upstream)
        .context("Failed to create Open Food Facts client")?;
    let state = AppState::new(Arc::new(client));
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;
    info!("gscan-lp listening on http://{}", config.bind_addr);
    info!("Health check: http://{}/health", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
