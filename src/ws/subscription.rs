//! Per-connection topic membership.
//!
//! Tracks which topics a WebSocket client has joined and keeps the
//! [`TopicRegistry`] in sync. The connection's single handle is shared
//! by every topic it joins; ending the membership (by hook or by drop)
//! closes the handle and leaves every topic.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::domain::{
    ChannelSubscriber, SubscriberHandle, SubscriberId, Termination, TopicRegistry,
};

/// Longest accepted topic name, in bytes.
pub const MAX_TOPIC_LEN: usize = 256;

/// Returns `true` if `topic` is an acceptable topic name.
#[must_use]
pub fn is_valid_topic(topic: &str) -> bool {
    !topic.trim().is_empty() && topic.len() <= MAX_TOPIC_LEN
}

/// Topic membership of a single WebSocket connection.
#[derive(Debug)]
pub struct TopicSubscriptions<H: SubscriberHandle = ChannelSubscriber> {
    handle: Arc<H>,
    registry: Arc<TopicRegistry<H>>,
    joined: BTreeSet<String>,
    ended: Option<Termination>,
}

impl<H: SubscriberHandle> TopicSubscriptions<H> {
    /// Creates an empty membership for `handle`.
    #[must_use]
    pub fn new(handle: Arc<H>, registry: Arc<TopicRegistry<H>>) -> Self {
        Self {
            handle,
            registry,
            joined: BTreeSet::new(),
            ended: None,
        }
    }

    /// Identity of the connection's handle.
    #[must_use]
    pub fn id(&self) -> SubscriberId {
        self.handle.id()
    }

    /// Joins each valid topic; returns the topics now joined from `topics`.
    pub fn subscribe(&mut self, topics: &[String]) -> Vec<String> {
        let mut joined = Vec::new();
        for topic in topics.iter().filter(|t| is_valid_topic(t)) {
            if self.joined.contains(topic)
                || self.registry.subscribe(topic, Arc::clone(&self.handle))
            {
                self.joined.insert(topic.clone());
                joined.push(topic.clone());
            }
        }
        joined
    }

    /// Leaves each listed topic; returns the topics actually left.
    pub fn unsubscribe(&mut self, topics: &[String]) -> Vec<String> {
        let mut left = Vec::new();
        for topic in topics {
            if self.joined.remove(topic) {
                self.registry.unsubscribe(topic, self.handle.id());
                left.push(topic.clone());
            }
        }
        left
    }

    /// Joined topics in name order.
    #[must_use]
    pub fn topics(&self) -> Vec<String> {
        self.joined.iter().cloned().collect()
    }

    /// Returns the number of joined topics.
    #[must_use]
    pub fn count(&self) -> usize {
        self.joined.len()
    }

    /// Normal completion hook.
    pub fn complete(&mut self) {
        self.end(Termination::Completed);
    }

    /// Transport error hook.
    pub fn error(&mut self, reason: impl Into<String>) {
        self.end(Termination::Failed(reason.into()));
    }

    fn end(&mut self, termination: Termination) {
        if self.ended.is_some() {
            return;
        }
        self.handle.close();
        let id = self.handle.id();
        for topic in std::mem::take(&mut self.joined) {
            self.registry.unsubscribe(&topic, id);
        }
        termination.log(id);
        self.ended = Some(termination);
    }
}

impl<H: SubscriberHandle> Drop for TopicSubscriptions<H> {
    fn drop(&mut self) {
        self.complete();
    }
}
