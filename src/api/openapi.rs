//! OpenAPI document for the REST surface.

use axum::Json;
use utoipa::OpenApi;

use super::handlers;

/// Generated OpenAPI description of the gateway's REST endpoints.
///
/// The SSE and WebSocket endpoints are not described here.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "fanout-gateway",
        description = "Real-time event fan-out over Server-Sent Events and WebSocket topics"
    ),
    paths(
        handlers::messages::publish_message,
        handlers::stats::stats_handler,
        handlers::system::health_handler,
    ),
    tags(
        (name = "Messages", description = "Producer entry point"),
        (name = "System", description = "Health and statistics"),
    )
)]
pub struct ApiDoc;

/// `GET /api-docs/openapi.json` — Raw OpenAPI document.
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
