//! Xero OAuth bridge.
//!
//! Runs the browser-facing OAuth2 flow against Xero and exposes a handful of
//! tenant-scoped accounting calls as JSON routes.
//!
//! ```text
//!     Browser ──▶ session middleware ──▶ handlers ──▶ identity / accounting API
//!        ▲                                   │
//!        └──────── redirect / HTML / JSON ◀──┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use xero_oauth_bridge::config::{load_config, ObservabilityConfig};
use xero_oauth_bridge::lifecycle::signals;
use xero_oauth_bridge::observability::{logging, metrics};
use xero_oauth_bridge::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "xero-oauth-bridge")]
#[command(about = "Browser session bridge to the Xero accounting API", long_about = None)]
struct Cli {
    /// TOML config file; defaults plus environment when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener port.
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            logging::init_logging(&ObservabilityConfig::default());
            tracing::error!(error = %e, "Invalid configuration, refusing to start");
            return Err(e.into());
        }
    };
    if let Some(port) = cli.port {
        config.listener.port = port;
    }

    logging::init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "xero-oauth-bridge starting");

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    tracing::info!(
        bind_address = %config.listener.bind_address(),
        redirect_uri = %config.xero.redirect_uri,
        scopes = config.xero.scopes.len(),
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    let listener = TcpListener::bind(config.listener.bind_address()).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    signals::install(shutdown.clone());

    let server = HttpServer::new(config)?;
    server.run(listener, shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
