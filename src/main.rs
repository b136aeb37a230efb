//! fanout-gateway server entry point.
//!
//! Starts the Axum HTTP server with publish, SSE and WebSocket endpoints.

use tracing_subscriber::EnvFilter;

use fanout_gateway::config::GatewayConfig;
use fanout_gateway::server::Gateway;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = GatewayConfig::from_env()?;
    let listen_addr = config.listen_addr;
    tracing::info!(
        addr = %listen_addr,
        queue_topic = %config.queue_topic,
        "starting fanout-gateway"
    );

    // Build queue, broadcaster and ingress
    let gateway = Gateway::start(config);

    // Start server
    let listener = tokio::net::TcpListener::bind(listen_addr).await?;
    tracing::info!(addr = %listen_addr, "server listening");

    gateway.serve(listener).await?;

    Ok(())
}
