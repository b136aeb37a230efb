//! Publish endpoint DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Optional request body for `POST /messages`.
///
/// An empty body, or one without `payload`, publishes the current
/// timestamp instead.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct PublishRequest {
    /// Arbitrary JSON forwarded verbatim to subscribers.
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub payload: Option<serde_json::Value>,
}

/// Response body for `POST /messages`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PublishResponse {
    /// Confirmation text.
    pub message: String,
}
