//! Per-topic subscription registries for the many-to-many channel.
//!
//! Each topic owns its own [`SubscriptionRegistry`]. Topics are created
//! on first subscription and dropped again once their last subscriber
//! leaves. All membership changes that can create or drop a topic go
//! through the outer lock, so a subscriber can never land in a registry
//! that has already been detached.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{ChannelSubscriber, SubscriberHandle, SubscriberId, SubscriptionRegistry};

/// Map of topic name to its [`SubscriptionRegistry`].
#[derive(Debug)]
pub struct TopicRegistry<H: SubscriberHandle = ChannelSubscriber> {
    topics: RwLock<HashMap<String, Arc<SubscriptionRegistry<H>>>>,
}

impl<H: SubscriberHandle> TopicRegistry<H> {
    /// Creates a registry with no topics.
    #[must_use]
    pub fn new() -> Self {
        Self {
            topics: RwLock::new(HashMap::new()),
        }
    }

    /// Adds `handle` to `topic`, creating the topic if needed.
    ///
    /// Returns `false` if the handle was already subscribed or is not
    /// active.
    pub fn subscribe(&self, topic: &str, handle: Arc<H>) -> bool {
        let mut topics = self.write();
        let added = topics
            .entry(topic.to_string())
            .or_insert_with(|| Arc::new(SubscriptionRegistry::new()))
            .add(handle);
        if topics.get(topic).is_some_and(|r| r.is_empty()) {
            topics.remove(topic);
        }
        added
    }

    /// Removes `id` from `topic`, dropping the topic once it is empty.
    ///
    /// Returns `true` if the subscriber was present.
    pub fn unsubscribe(&self, topic: &str, id: SubscriberId) -> bool {
        let mut topics = self.write();
        let Some(registry) = topics.get(topic) else {
            return false;
        };
        let removed = registry.remove(id);
        if registry.is_empty() {
            topics.remove(topic);
        }
        removed
    }

    /// Returns the registry for `topic`, if anyone is subscribed.
    #[must_use]
    pub fn get(&self, topic: &str) -> Option<Arc<SubscriptionRegistry<H>>> {
        self.read().get(topic).cloned()
    }

    /// Drops `topic` if evictions have left it without subscribers.
    pub fn prune(&self, topic: &str) {
        let mut topics = self.write();
        if topics.get(topic).is_some_and(|r| r.is_empty()) {
            topics.remove(topic);
            tracing::debug!(topic, "dropped empty topic");
        }
    }

    /// Subscriber count per topic, ordered by topic name.
    #[must_use]
    pub fn subscriber_counts(&self) -> BTreeMap<String, usize> {
        self.read()
            .iter()
            .map(|(name, registry)| (name.clone(), registry.len()))
            .collect()
    }

    /// Number of topics with at least one subscriber.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Returns `true` if there are no topics.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Arc<SubscriptionRegistry<H>>>> {
        self.topics.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Arc<SubscriptionRegistry<H>>>> {
        self.topics.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<H: SubscriberHandle> Default for TopicRegistry<H> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_support::RecordingSubscriber;

    #[test]
    fn subscribe_creates_topic() {
        let topics = TopicRegistry::new();
        let a = RecordingSubscriber::healthy();

        assert!(topics.subscribe("chat", Arc::clone(&a)));
        assert!(!topics.subscribe("chat", Arc::clone(&a)));
        assert_eq!(topics.len(), 1);
        assert!(topics.get("chat").is_some_and(|r| r.contains(a.id())));
        assert!(topics.get("other").is_none());
    }

    #[test]
    fn last_unsubscribe_drops_topic() {
        let topics = TopicRegistry::new();
        let a = RecordingSubscriber::healthy();
        let b = RecordingSubscriber::healthy();
        topics.subscribe("chat", Arc::clone(&a));
        topics.subscribe("chat", Arc::clone(&b));

        assert!(topics.unsubscribe("chat", a.id()));
        assert_eq!(topics.len(), 1);
        assert!(topics.unsubscribe("chat", b.id()));
        assert!(topics.is_empty());
        assert!(!topics.unsubscribe("chat", b.id()));
    }

    #[test]
    fn closed_handle_does_not_create_topic() {
        let topics = TopicRegistry::new();
        let a = RecordingSubscriber::healthy();
        a.close();

        assert!(!topics.subscribe("chat", a));
        assert!(topics.is_empty());
    }

    #[test]
    fn prune_only_drops_empty_topics() {
        let topics = TopicRegistry::new();
        let a = RecordingSubscriber::healthy();
        topics.subscribe("chat", Arc::clone(&a));

        topics.prune("chat");
        assert_eq!(topics.len(), 1);

        if let Some(registry) = topics.get("chat") {
            registry.remove(a.id());
        }
        topics.prune("chat");
        assert!(topics.is_empty());
    }

    #[test]
    fn counts_are_sorted_by_topic() {
        let topics = TopicRegistry::new();
        topics.subscribe("zeta", RecordingSubscriber::healthy());
        topics.subscribe("alpha", RecordingSubscriber::healthy());
        topics.subscribe("alpha", RecordingSubscriber::healthy());

        let counts: Vec<_> = topics.subscriber_counts().into_iter().collect();
        assert_eq!(
            counts,
            vec![("alpha".to_string(), 2), ("zeta".to_string(), 1)]
        );
    }
}
