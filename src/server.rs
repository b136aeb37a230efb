//! Application assembly: wires queue, ingress, broadcaster and router.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::app_state::AppState;
use crate::config::GatewayConfig;
use crate::domain::Broadcaster;
use crate::queue::{IngressAdapter, MessageQueue};
use crate::sse::handler::sse_handler;
use crate::ws::handler::ws_handler;

/// Path of the SSE endpoint.
pub const SSE_PATH: &str = "/view-messages-sse";

/// Path of the WebSocket endpoint.
pub const WS_PATH: &str = "/ws";

/// A running gateway: shared state plus the ingress task.
#[derive(Debug)]
pub struct Gateway {
    state: AppState,
    ingress: JoinHandle<()>,
}

impl Gateway {
    /// Builds the queue and broadcaster and starts the ingress adapter.
    ///
    /// Must be called from within a Tokio runtime.
    #[must_use]
    pub fn start(config: GatewayConfig) -> Self {
        let broadcaster = Broadcaster::new();
        let (producer, consumer) = MessageQueue::new(&config.queue_topic, config.queue_capacity);
        let ingress =
            IngressAdapter::new(consumer, broadcaster.clone(), config.ingress_topic.clone())
                .spawn();

        let state = AppState {
            broadcaster,
            producer,
            config: Arc::new(config),
        };
        Self { state, ingress }
    }

    /// Shared application state.
    #[must_use]
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Router serving every endpoint of this gateway.
    #[must_use]
    pub fn router(&self) -> Router {
        build_app(self.state.clone())
    }

    /// Serves HTTP on `listener` until the server stops.
    ///
    /// # Errors
    ///
    /// Returns any I/O error reported by the server.
    pub async fn serve(self, listener: TcpListener) -> std::io::Result<()> {
        let app = self.router();
        let result = axum::serve(listener, app).await;
        self.ingress.abort();
        result
    }
}

/// Builds the full router over `state`.
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .merge(api::build_router())
        .route(SSE_PATH, get(sse_handler))
        .route(WS_PATH, get(ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
