//! Immutable event payload fanned out to subscribers.

use std::sync::Arc;

use chrono::{DateTime, Utc};

/// One event flowing through the broadcaster.
///
/// The payload is opaque JSON shared behind an [`Arc`], so cloning an
/// event for every subscriber never copies the payload itself. An event
/// has no identity beyond its arrival order.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    payload: Arc<serde_json::Value>,
    topic: Option<Arc<str>>,
    received_at: DateTime<Utc>,
}

impl Event {
    /// Creates an event stamped with the current time.
    #[must_use]
    pub fn new(payload: serde_json::Value) -> Self {
        Self {
            payload: Arc::new(payload),
            topic: None,
            received_at: Utc::now(),
        }
    }

    /// Returns a copy of this event addressed to `topic`.
    ///
    /// The payload is shared with the original, not cloned.
    #[must_use]
    pub fn on_topic(&self, topic: &str) -> Self {
        Self {
            payload: Arc::clone(&self.payload),
            topic: Some(Arc::from(topic)),
            received_at: self.received_at,
        }
    }

    /// Returns the opaque payload.
    #[must_use]
    pub fn payload(&self) -> &serde_json::Value {
        &self.payload
    }

    /// Returns the topic this event was published on, if any.
    #[must_use]
    pub fn topic(&self) -> Option<&str> {
        self.topic.as_deref()
    }

    /// Returns the instant the event entered the gateway.
    #[must_use]
    pub const fn received_at(&self) -> DateTime<Utc> {
        self.received_at
    }

    /// Renders the payload as wire text.
    ///
    /// String payloads are emitted raw (no surrounding quotes); anything
    /// else is serialized as compact JSON.
    #[must_use]
    pub fn payload_text(&self) -> String {
        match self.payload.as_ref() {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

impl From<&str> for Event {
    fn from(payload: &str) -> Self {
        Self::new(serde_json::Value::String(payload.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_payload_renders_raw() {
        let event = Event::from("2024-01-01T00:00:00.000");
        assert_eq!(event.payload_text(), "2024-01-01T00:00:00.000");
    }

    #[test]
    fn object_payload_renders_json() {
        let event = Event::new(serde_json::json!({"k": 1}));
        assert_eq!(event.payload_text(), r#"{"k":1}"#);
    }

    #[test]
    fn on_topic_shares_payload() {
        let event = Event::from("x");
        let routed = event.on_topic("chat");
        assert_eq!(routed.topic(), Some("chat"));
        assert!(event.topic().is_none());
        assert!(Arc::ptr_eq(&event.payload, &routed.payload));
        assert_eq!(event.received_at(), routed.received_at());
    }
}
