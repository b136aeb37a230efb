//! Transport lifecycle hooks for registered subscribers.
//!
//! A transport wraps each registration in a [`SubscriptionGuard`] and
//! reports how the connection ended: normal completion, timeout, or a
//! transport error. Every path closes the handle and removes it from
//! the registry. Dropping the guard without calling a hook counts as
//! completion, which covers clients that simply disconnect.

use std::fmt;
use std::sync::Arc;

use super::{ChannelSubscriber, SubscriberHandle, SubscriberId, SubscriptionRegistry};

/// How a subscriber's connection ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Termination {
    /// The client or server finished the stream normally.
    Completed,
    /// The connection exceeded its configured lifetime.
    TimedOut,
    /// The transport reported an error.
    Failed(String),
}

impl Termination {
    /// Logs the termination at a level matching its severity.
    pub fn log(&self, id: SubscriberId) {
        match self {
            Self::Completed => tracing::debug!(subscriber = %id, "subscriber completed"),
            Self::TimedOut => tracing::info!(subscriber = %id, "subscriber timed out"),
            Self::Failed(reason) => {
                tracing::warn!(subscriber = %id, reason = %reason, "subscriber failed");
            }
        }
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed => write!(f, "completed"),
            Self::TimedOut => write!(f, "timed out"),
            Self::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// Registration of one handle in one registry, ended exactly once.
///
/// Hooks may race with an in-flight fan-out evicting the same handle;
/// removal is idempotent so either order is harmless.
#[derive(Debug)]
pub struct SubscriptionGuard<H: SubscriberHandle = ChannelSubscriber> {
    handle: Arc<H>,
    registry: Arc<SubscriptionRegistry<H>>,
    ended: Option<Termination>,
}

impl<H: SubscriberHandle> SubscriptionGuard<H> {
    /// Adds `handle` to `registry` and returns the guard owning that
    /// membership.
    #[must_use]
    pub fn register(registry: Arc<SubscriptionRegistry<H>>, handle: Arc<H>) -> Self {
        registry.add(Arc::clone(&handle));
        tracing::debug!(subscriber = %handle.id(), total = registry.len(), "subscriber registered");
        Self {
            handle,
            registry,
            ended: None,
        }
    }

    /// Identity of the guarded handle.
    #[must_use]
    pub fn id(&self) -> SubscriberId {
        self.handle.id()
    }

    /// How the subscription ended, once a hook has fired.
    #[must_use]
    pub fn termination(&self) -> Option<&Termination> {
        self.ended.as_ref()
    }

    /// Normal completion hook.
    pub fn complete(&mut self) {
        self.end(Termination::Completed);
    }

    /// Timeout hook.
    pub fn timeout(&mut self) {
        self.end(Termination::TimedOut);
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
        self.registry.remove(self.handle.id());
        termination.log(self.handle.id());
        self.ended = Some(termination);
    }
}

impl<H: SubscriberHandle> Drop for SubscriptionGuard<H> {
    fn drop(&mut self) {
        self.complete();
    }
}
