use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

use vehicle_gateway::app::submit::Submitter;
use vehicle_gateway::broker::BrokerConnection;
use vehicle_gateway::config::Config;
use vehicle_gateway::server::{start_server, AppState};
use vehicle_gateway::{logging, metrics};

#[derive(Parser)]
#[command(name = "vehicle-gateway")]
#[command(about = "Forwards vehicle-detection events to ActiveMQ Artemis over STOMP")]
#[command(version = "0.1.0")]
struct Cli {
    /// Override the HTTP listen host
    #[arg(long)]
    host: Option<String>,

    /// Override the HTTP listen port
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    logging::init_logging();
    metrics::init_metrics();

    let cli = Cli::parse();
    let mut config = Config::from_env()?;
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    let broker = Arc::new(BrokerConnection::new(config.artemis.clone()));

    // Initial connection attempt; failure is non-fatal, the first send
    // reconnects inline.
    if let Err(e) = broker.connect().await {
        warn!("Initial connection failed, will retry on first send: {e}");
    }

    let state = AppState {
        broker: broker.clone(),
        submitter: Arc::new(Submitter::new(broker.clone())),
    };

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| {
            format!(
                "invalid HTTP listen address {}:{}",
                config.server.host, config.server.port
            )
        })?;

    start_server(state, addr).await?;

    // Graceful teardown once the server has drained.
    broker.disconnect().await;
    info!("Gateway stopped");

    Ok(())
}
