//! Live subscriber statistics.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{StatsResponse, TopicStatsDto};
use crate::app_state::AppState;

/// `GET /stats` — Current subscriber counts.
#[utoipa::path(
    get,
    path = "/api/v1/stats",
    tag = "System",
    summary = "Subscriber statistics",
    description = "Returns the number of live SSE subscribers and live subscribers per WebSocket topic.",
    responses(
        (status = 200, description = "Subscriber counts", body = StatsResponse),
    )
)]
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let topics = state
        .broadcaster
        .topics()
        .subscriber_counts()
        .into_iter()
        .map(|(topic, subscribers)| TopicStatsDto { topic, subscribers })
        .collect();

    Json(StatsResponse {
        stream_subscribers: state.broadcaster.stream().len(),
        topics,
    })
}

/// Statistics routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/stats", get(stats_handler))
}
