use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wsbridge::config::{load_config, BridgeConfig};
use wsbridge::http::BridgeServer;
use wsbridge::lifecycle::raise_open_file_limit;
use wsbridge::observability::metrics::init_metrics;

#[derive(Parser)]
#[command(name = "wsbridge")]
#[command(about = "WebSocket to HTTP bridge", long_about = None)]
struct Cli {
    /// Path to a JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on for WebSocket and ingress traffic
    #[arg(short, long)]
    listen: Option<String>,

    /// Base URL of the backend HTTP service
    #[arg(short, long)]
    url: Option<String>,

    /// Address to serve Prometheus metrics on
    #[arg(short, long)]
    metrics: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wsbridge=info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let mut config = match cli.config {
        Some(ref path) => load_config(path)?,
        None => BridgeConfig::default(),
    };
    if let Some(listen) = cli.listen {
        config.listener.bind_address = listen;
    }
    if let Some(url) = cli.url {
        config.backend.base_url = url;
    }
    if let Some(metrics) = cli.metrics {
        config.observability.metrics_address = Some(metrics);
    }

    tracing::info!(
        bind_address = %config.listener.bind_address,
        backend_url = %config.backend.base_url,
        queue_capacity = config.queues.capacity,
        "Configuration loaded"
    );

    raise_open_file_limit();

    if let Some(ref addr) = config.observability.metrics_address {
        match addr.parse() {
            Ok(addr) => init_metrics(addr),
            Err(err) => {
                tracing::error!(metrics_address = %addr, %err, "Failed to parse metrics address")
            }
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = BridgeServer::new(&config)?;
    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
