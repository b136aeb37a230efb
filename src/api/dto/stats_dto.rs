//! Subscriber statistics DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Response body for `GET /api/v1/stats`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatsResponse {
    /// Live SSE subscribers.
    pub stream_subscribers: usize,
    /// Live subscribers per WebSocket topic, sorted by topic name.
    pub topics: Vec<TopicStatsDto>,
}

/// Subscriber count for one topic.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TopicStatsDto {
    /// Topic name.
    pub topic: String,
    /// Live subscribers of the topic.
    pub subscribers: usize,
}
