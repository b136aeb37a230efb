//! Ingress adapter: queue consumer feeding the broadcaster.

use tokio::task::JoinHandle;

use super::QueueConsumer;
use crate::domain::{Broadcaster, Event, PublishReport};

/// Drains a [`QueueConsumer`] and publishes every record.
///
/// Each record is published to the stream registry and, when an ingress
/// topic is configured, to that topic as well. Records are handled one
/// at a time, so every subscriber sees them in queue order.
#[derive(Debug)]
pub struct IngressAdapter {
    consumer: QueueConsumer,
    broadcaster: Broadcaster,
    ingress_topic: Option<String>,
}

impl IngressAdapter {
    /// Creates an adapter. Nothing is consumed until [`run`](Self::run).
    #[must_use]
    pub fn new(
        consumer: QueueConsumer,
        broadcaster: Broadcaster,
        ingress_topic: Option<String>,
    ) -> Self {
        Self {
            consumer,
            broadcaster,
            ingress_topic,
        }
    }

    /// Consumes until every producer is gone.
    pub async fn run(mut self) {
        tracing::info!(topic = self.consumer.topic(), "ingress adapter started");

        while let Some(record) = self.consumer.recv().await {
            tracing::info!(
                topic = %record.topic,
                payload = %record.payload,
                "received new message"
            );
            let event = Event::new(record.payload);

            let stream = self.broadcaster.publish(&event).await;
            let topic = match &self.ingress_topic {
                Some(topic) => self.broadcaster.publish_to_topic(topic, &event).await,
                None => PublishReport::default(),
            };
            tracing::debug!(
                stream_delivered = stream.delivered,
                topic_delivered = topic.delivered,
                "event fanned out"
            );
        }

        tracing::info!(topic = self.consumer.topic(), "queue closed, ingress adapter stopped");
    }

    /// Runs the adapter on its own task.
    #[must_use]
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }
}
