//! Domain layer: events, subscriber handles, registries and fan-out.
//!
//! Everything here is transport-agnostic. The SSE and WebSocket layers
//! supply [`ChannelSubscriber`] handles; the ingress adapter and the
//! topic channel drive [`Broadcaster`].

pub mod broadcaster;
pub mod event;
pub mod lifecycle;
pub mod registry;
pub mod subscriber;
pub mod subscriber_id;
pub mod topic_registry;

#[cfg(test)]
pub(crate) mod test_support;

pub use broadcaster::{Broadcaster, PublishReport, fan_out};
pub use event::Event;
pub use lifecycle::{SubscriptionGuard, Termination};
pub use registry::{Snapshot, SubscriptionRegistry};
pub use subscriber::{ChannelSubscriber, DeliveryError, SubscriberHandle, SubscriberState};
pub use subscriber_id::SubscriberId;
pub use topic_registry::TopicRegistry;
