//! WebSocket message types: envelope, commands, and topic events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Top-level WebSocket message envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WsMessage {
    /// Client-provided ID for requests; server-generated for events.
    pub id: String,
    /// Message type discriminator.
    #[serde(rename = "type")]
    pub msg_type: WsMessageType,
    /// ISO-8601 timestamp.
    pub timestamp: DateTime<Utc>,
    /// Variant-specific payload.
    pub payload: serde_json::Value,
}

impl WsMessage {
    /// Builds a server-originated message stamped with the current time.
    #[must_use]
    pub fn new(id: String, msg_type: WsMessageType, payload: serde_json::Value) -> Self {
        Self {
            id,
            msg_type,
            timestamp: Utc::now(),
            payload,
        }
    }

    /// Builds an error message with a numeric code.
    #[must_use]
    pub fn error(id: String, code: u16, message: &str) -> Self {
        Self::new(
            id,
            WsMessageType::Error,
            serde_json::json!({ "code": code, "message": message }),
        )
    }
}

/// Discriminator for WebSocket message types.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WsMessageType {
    /// Client → Server command.
    Command,
    /// Server → Client response to a command.
    Response,
    /// Server → Client topic event.
    Event,
    /// Server → Client error.
    Error,
}

/// Commands that a client can send over WebSocket, carried in the
/// envelope's `payload`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum WsCommand {
    /// Start receiving events published on these topics.
    Subscribe {
        /// Topic names.
        topics: Vec<String>,
    },
    /// Stop receiving events from these topics.
    Unsubscribe {
        /// Topic names.
        topics: Vec<String>,
    },
    /// Re-broadcast `data` verbatim to every subscriber of `topic`.
    Publish {
        /// Target topic.
        topic: String,
        /// Arbitrary JSON payload.
        data: serde_json::Value,
    },
}

/// Payload of an [`WsMessageType::Event`] message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TopicEvent {
    /// Topic the event was published on.
    pub topic: String,
    /// The published payload, unchanged.
    pub data: serde_json::Value,
}
