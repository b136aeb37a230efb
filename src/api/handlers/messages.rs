//! Publish endpoint: forwards producer requests to the message queue.

use axum::body::Bytes;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::{PublishRequest, PublishResponse};
use crate::app_state::AppState;
use crate::clock;
use crate::error::{ErrorResponse, GatewayError};

/// `POST /messages` — Enqueue a message for fan-out.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidRequest`] for a malformed body and
/// [`GatewayError::QueueUnavailable`] if the queue consumer has stopped.
#[utoipa::path(
    post,
    path = "/messages",
    tag = "Messages",
    summary = "Publish a message",
    description = "Enqueues a message on the ingress queue. Without a `payload` the current timestamp is published.",
    request_body = PublishRequest,
    responses(
        (status = 200, description = "Message enqueued", body = PublishResponse),
        (status = 400, description = "Malformed request body", body = ErrorResponse),
        (status = 503, description = "Queue unavailable", body = ErrorResponse),
    )
)]
pub async fn publish_message(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<PublishResponse>, GatewayError> {
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        PublishRequest::default()
    } else {
        serde_json::from_slice::<PublishRequest>(&body)?
    };
    let payload = request
        .payload
        .unwrap_or_else(|| serde_json::Value::String(clock::iso_now()));

    state.producer.send(payload).await?;
    tracing::debug!(topic = state.producer.topic(), "message enqueued");

    Ok(Json(PublishResponse {
        message: "New Message added".to_string(),
    }))
}

/// Publish endpoint routes, mounted at the root level.
pub fn routes() -> Router<AppState> {
    Router::new().route("/messages", post(publish_message))
}
