//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::config::GatewayConfig;
use crate::domain::Broadcaster;
use crate::queue::QueueProducer;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Fan-out hub owning the stream and topic registries.
    pub broadcaster: Broadcaster,
    /// Write side of the message queue, used by the publish endpoint.
    pub producer: QueueProducer,
    /// Settings the transports need per connection.
    pub config: Arc<GatewayConfig>,
}
