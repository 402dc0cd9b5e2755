//! Insult aggregation service (v1)
//!
//! Fans out to the noun and adjective services, guards each dependency with
//! its own circuit breaker, and composes the words into one result.
//!
//! # Architecture Overview
//!
//! ```text
//!                  ┌───────────────────────────────────────────────────┐
//!                  │                  INSULT SERVICE                    │
//!                  │                                                    │
//!   Client ────────┼─▶ http ──▶ aggregate ──┬─▶ breaker(noun) ──────────┼──▶ Noun service
//!                  │      │                 ├─▶ breaker(adj) ───────────┼──▶ Adjective service
//!                  │      │                 └─▶ breaker(adj) ───────────┼──▶ Adjective service
//!                  │      │                                             │
//!                  │      ├──▶ publish (fire-and-report) ───────────────┼──▶ Message broker
//!                  │      └──▶ health (breaker states)                  │
//!                  │                                                    │
//!                  │   config · observability · lifecycle               │
//!                  └───────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use insult_service::config::{load_config, ServiceConfig};
use insult_service::http::HttpServer;
use insult_service::lifecycle::{wait_for_signal, Shutdown};
use insult_service::observability::{logging, metrics};
use insult_service::service::InsultService;

#[derive(Parser)]
#[command(name = "insult-service")]
#[command(about = "Resilient fan-out insult aggregator", long_about = None)]
struct Args {
    /// Path to a TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => ServiceConfig::default(),
    };

    logging::init(&config.observability);
    tracing::info!("insult-service v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        noun = %format!("{}:{}", config.noun.host, config.noun.port),
        adjective = %format!("{}:{}", config.adjective.host, config.adjective.port),
        publish_enabled = config.publish.enabled,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let service = InsultService::from_config(&config)?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    tokio::spawn(wait_for_signal(shutdown.clone()));

    let server = HttpServer::new(config, service);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
