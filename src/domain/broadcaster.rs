//! Event fan-out with eviction of failed subscribers.
//!
//! [`Broadcaster`] owns one [`SubscriptionRegistry`] for the streaming
//! (SSE) style and a [`TopicRegistry`] for the topic (WebSocket) style.
//! Both styles run the same algorithm, [`fan_out`]:
//!
//! ```text
//! publish(event)
//!     │
//!     ├── snapshot registry
//!     ├── deliver to every handle concurrently ──► Ok  → delivered
//!     │                                        └─► Err → collected
//!     └── close + remove every collected handle
//! ```

use std::sync::Arc;

use futures_util::future::join_all;

use super::{ChannelSubscriber, Event, SubscriberHandle, SubscriptionRegistry, TopicRegistry};

/// Outcome of one fan-out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishReport {
    /// Handles in the snapshot, i.e. delivery attempts made.
    pub attempted: usize,
    /// Attempts that succeeded.
    pub delivered: usize,
    /// Handles removed because their attempt failed.
    pub evicted: usize,
}

/// Delivers `event` to every handle registered at call time.
///
/// Deliveries run concurrently and a failure never short-circuits the
/// others. Every handle whose attempt failed is closed and removed from
/// `registry` before this returns. Nothing is retried.
pub async fn fan_out<H: SubscriberHandle>(
    registry: &SubscriptionRegistry<H>,
    event: &Event,
) -> PublishReport {
    let snapshot = registry.snapshot();
    if snapshot.is_empty() {
        return PublishReport::default();
    }

    let attempts = snapshot
        .iter()
        .map(|handle| async move { (handle, handle.deliver(event).await) });
    let outcomes = join_all(attempts).await;

    let mut report = PublishReport {
        attempted: outcomes.len(),
        ..PublishReport::default()
    };
    for (handle, outcome) in outcomes {
        match outcome {
            Ok(()) => report.delivered += 1,
            Err(err) => {
                handle.close();
                registry.remove(handle.id());
                report.evicted += 1;
                tracing::debug!(subscriber = %handle.id(), error = %err, "evicted subscriber");
            }
        }
    }
    report
}

/// Fan-out hub shared by the ingress adapter and the transports.
///
/// Cloning is cheap; clones share the same registries.
#[derive(Debug)]
pub struct Broadcaster<H: SubscriberHandle = ChannelSubscriber> {
    stream: Arc<SubscriptionRegistry<H>>,
    topics: Arc<TopicRegistry<H>>,
}

impl<H: SubscriberHandle> Broadcaster<H> {
    /// Creates a broadcaster with empty registries.
    #[must_use]
    pub fn new() -> Self {
        Self {
            stream: Arc::new(SubscriptionRegistry::new()),
            topics: Arc::new(TopicRegistry::new()),
        }
    }

    /// Registry of streaming (SSE) subscribers.
    #[must_use]
    pub fn stream(&self) -> &Arc<SubscriptionRegistry<H>> {
        &self.stream
    }

    /// Registry of topic (WebSocket) subscribers.
    #[must_use]
    pub fn topics(&self) -> &Arc<TopicRegistry<H>> {
        &self.topics
    }

    /// Fans `event` out to every streaming subscriber.
    pub async fn publish(&self, event: &Event) -> PublishReport {
        let report = fan_out(&self.stream, event).await;
        if report.evicted > 0 {
            tracing::info!(
                delivered = report.delivered,
                evicted = report.evicted,
                "stream subscribers evicted"
            );
        }
        report
    }

    /// Fans `event` out to every subscriber of `topic`.
    ///
    /// Publishing to a topic nobody subscribes to is a no-op.
    pub async fn publish_to_topic(&self, topic: &str, event: &Event) -> PublishReport {
        let Some(registry) = self.topics.get(topic) else {
            return PublishReport::default();
        };
        let report = fan_out(&registry, &event.on_topic(topic)).await;
        if report.evicted > 0 {
            self.topics.prune(topic);
            tracing::info!(
                topic,
                delivered = report.delivered,
                evicted = report.evicted,
                "topic subscribers evicted"
            );
        }
        report
    }
}

impl<H: SubscriberHandle> Clone for Broadcaster<H> {
    fn clone(&self) -> Self {
        Self {
            stream: Arc::clone(&self.stream),
            topics: Arc::clone(&self.topics),
        }
    }
}

impl<H: SubscriberHandle> Default for Broadcaster<H> {
    fn default() -> Self {
        Self::new()
    }
}
