//! Message queue boundary and ingress adapter.
//!
//! [`MessageQueue`] is the in-process stand-in for an external broker
//! topic: any number of [`QueueProducer`]s feed one [`QueueConsumer`].
//! The [`IngressAdapter`] drains the consumer and hands each record to
//! the [`crate::domain::Broadcaster`].

pub mod ingress;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;

use crate::error::GatewayError;

pub use ingress::IngressAdapter;

/// One record as it travels through the queue.
#[derive(Debug, Clone)]
pub struct QueueRecord {
    /// Topic the record was produced to.
    pub topic: Arc<str>,
    /// Opaque producer payload.
    pub payload: serde_json::Value,
    /// When the producer enqueued it.
    pub produced_at: DateTime<Utc>,
}

/// Factory for a bounded single-topic queue.
#[derive(Debug)]
pub struct MessageQueue;

impl MessageQueue {
    /// Creates a queue for `topic` holding at most `capacity` records.
    ///
    /// `capacity` is clamped to at least 1.
    #[must_use]
    pub fn new(topic: &str, capacity: usize) -> (QueueProducer, QueueConsumer) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let topic: Arc<str> = Arc::from(topic);
        let producer = QueueProducer {
            topic: Arc::clone(&topic),
            sender,
        };
        let consumer = QueueConsumer { topic, receiver };
        (producer, consumer)
    }
}

/// Write side of the queue. Cheap to clone.
#[derive(Debug, Clone)]
pub struct QueueProducer {
    topic: Arc<str>,
    sender: mpsc::Sender<QueueRecord>,
}

impl QueueProducer {
    /// Topic this producer writes to.
    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Enqueues `payload`, waiting while the queue is full.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::QueueUnavailable`] once the consumer has
    /// been dropped.
    pub async fn send(&self, payload: serde_json::Value) -> Result<(), GatewayError> {
        let record = QueueRecord {
            topic: Arc::clone(&self.topic),
            payload,
            produced_at: Utc::now(),
        };
        self.sender
            .send(record)
            .await
            .map_err(|_| GatewayError::QueueUnavailable("consumer stopped".to_string()))
    }
}

/// Read side of the queue.
#[derive(Debug)]
pub struct QueueConsumer {
    topic: Arc<str>,
    receiver: mpsc::Receiver<QueueRecord>,
}

impl QueueConsumer {
    /// Topic this consumer reads from.
    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Waits for the next record. Returns `None` once every producer
    /// has been dropped and the queue is drained.
    pub async fn recv(&mut self) -> Option<QueueRecord> {
        self.receiver.recv().await
    }
}
