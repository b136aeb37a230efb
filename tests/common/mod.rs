//! Shared helpers for integration tests.

#![allow(dead_code, clippy::panic)]

use std::net::SocketAddr;
use std::time::Duration;

use fanout_gateway::app_state::AppState;
use fanout_gateway::config::GatewayConfig;
use fanout_gateway::server::Gateway;
use tokio::net::TcpListener;

/// Configuration tuned for fast, deterministic tests.
pub fn test_config() -> GatewayConfig {
    GatewayConfig {
        listen_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
        delivery_timeout: Duration::from_millis(200),
        sse_keep_alive: Duration::from_millis(100),
        ..GatewayConfig::default()
    }
}

/// Starts a gateway on an ephemeral port and returns its address.
pub async fn spawn_gateway(config: GatewayConfig) -> (SocketAddr, AppState) {
    let Ok(listener) = TcpListener::bind(config.listen_addr).await else {
        panic!("failed to bind test listener");
    };
    let Ok(addr) = listener.local_addr() else {
        panic!("listener has no local address");
    };
    let gateway = Gateway::start(config);
    let state = gateway.state().clone();
    tokio::spawn(gateway.serve(listener));
    (addr, state)
}

/// Polls `check` every 20 ms until it holds or five seconds pass.
pub async fn eventually(mut check: impl FnMut() -> bool) -> bool {
    for _ in 0..250 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    check()
}
