//! json-include demo server.
//!
//! Serves a small car catalog whose resources link to each other through
//! `<name>_url` properties, wrapped in the include middleware.
//!
//! ```text
//! GET /api/cars/1?include=manufacturer,dealer
//!     → handler emits {id, manufacturer_url, dealer_url, ...}
//!     → include middleware GETs both URLs concurrently
//!     → {id, manufacturer_url, manufacturer: {...}, dealer_url, dealer: {...}}
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use json_include::config::{load_config, AppConfig};
use json_include::lifecycle::{signals, Shutdown};
use json_include::observability::{logging, metrics};
use json_include::HttpServer;

#[derive(Parser)]
#[command(name = "json-include")]
#[command(about = "Demo API with ?include= expansion of <name>_url links", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    logging::init(&config.observability.log_level);
    tracing::info!("json-include v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        forwarded_headers = ?config.include.headers,
        max_concurrent_fetches = ?config.include.max_concurrent_fetches,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    signals::spawn_signal_listener(&shutdown);

    let server = HttpServer::new(config)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
