//! gscan-sc (Scan Controller) - terminal front end for a scan session
//!
//! Reads decode batches from stdin, one line per batch with comma-separated
//! values, as a camera scanner would report them. Commands:
//!
//! - `again`: scan another product after a result or error
//! - `cancel`: abandon the lookup in flight
//! - `devices`: list cameras
//! - `device <id>` / `device default`: select a camera
//! - `quit`

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use gscan_sc::config::{CliOverrides, ControllerConfig, ScanTomlConfig, MODULE_NAME};
use gscan_sc::devices::device_options;
use gscan_sc::display::render_events;
use gscan_sc::{DisplaySurface, ProxyClient, ScanController, TerminalDisplay};
use reqwest::Url;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for gscan-sc
#[derive(Parser, Debug)]
#[command(name = "gscan-sc")]
#[command(about = "GreenScan scan session controller")]
#[command(version)]
struct Args {
    /// TOML config file (default: ~/.config/greenscan/gscan-sc.toml)
    #[arg(short, long, env = "GSCAN_SC_CONFIG")]
    config: Option<PathBuf>,

    /// Lookup proxy base URL (env: GSCAN_PROXY_URL)
    #[arg(short, long)]
    proxy_url: Option<Url>,

    /// Lookup timeout in seconds (env: GSCAN_LOOKUP_TIMEOUT_SECS)
    #[arg(long)]
    lookup_timeout_secs: Option<u64>,

    /// Camera device id (env: GSCAN_DEVICE_ID)
    #[arg(short, long)]
    device: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let toml_config: ScanTomlConfig =
        gscan_common::config::load_toml_config(args.config.as_deref(), MODULE_NAME)
            .context("Failed to load configuration")?;
    let config = ControllerConfig::resolve(
        CliOverrides {
            proxy_url: args.proxy_url,
            lookup_timeout_secs: args.lookup_timeout_secs,
            device_id: args.device,
        },
        toml_config,
    )
    .context("Invalid configuration")?;

    // stdout belongs to the display; logs go to stderr
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!(
        "Starting GreenScan Scan Controller (gscan-sc) v{}",
        env!("CARGO_PKG_VERSION")
    );
    info!(
        "Lookup proxy: {} (timeout {:?})",
        config.proxy_url, config.lookup_timeout
    );

    let client = ProxyClient::new(&config.proxy_url).context("Failed to create proxy client")?;
    let controller = ScanController::new(
        Arc::new(client),
        config.lookup_timeout,
        config.device_id.clone(),
    );

    let settings = controller.scanner_settings().await;
    info!(
        "Scanner settings: {}",
        serde_json::to_string(&settings).context("Failed to serialize scanner settings")?
    );

    // Subscribe before the first decode so no transition goes unrendered
    let events = controller.subscribe();
    let shutdown = CancellationToken::new();
    let mut display = TerminalDisplay::new(std::io::stdout());
    display
        .render(&controller.state().await)
        .context("Failed to write to terminal")?;
    let renderer = tokio::spawn(render_events(display, events, shutdown.clone()));
    info!(subscribers = controller.subscriber_count(), "Display attached");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let end = loop {
        let line = tokio::select! {
            line = lines.next_line() => line.context("Failed to read stdin")?,
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down");
                break SessionEnd::Abandon;
            }
        };
        let Some(line) = line else {
            break SessionEnd::Finish;
        };

        let line = line.trim();
        match line.split_once(' ').map_or((line, ""), |(cmd, rest)| (cmd, rest.trim())) {
            ("", _) => {}
            ("quit" | "exit", _) => break SessionEnd::Abandon,
            ("again", _) => {
                controller.scan_again().await;
            }
            ("cancel", _) => {
                controller.cancel().await;
            }
            ("devices", _) => {
                let selected = controller.device_id().await;
                for (id, label) in device_options(&config.cameras) {
                    let marker = if id == selected { "*" } else { " " };
                    println!("{} {} ({})", marker, label, id.as_deref().unwrap_or("default"));
                }
            }
            ("device", "" | "default") => controller.select_device(None).await,
            ("device", id) => controller.select_device(Some(id.to_string())).await,
            _ => {
                controller.handle_decode(line.split(',')).await;
            }
        }
    };

    match end {
        // End of input: let the last lookup finish so its outcome is shown
        SessionEnd::Finish => {
            controller.settled().await;
        }
        SessionEnd::Abandon => {
            controller.cancel().await;
        }
    }
    shutdown.cancel();
    renderer.await.context("Display task failed")?;

    info!("Scan session closed");
    Ok(())
}

/// How the input loop ended
enum SessionEnd {
    /// stdin closed
    Finish,
    /// quit command or Ctrl+C
    Abandon,
}
