//! Subscriber handles: the sink side of a live connection.
//!
//! The broadcaster only ever talks to a subscriber through the
//! [`SubscriberHandle`] trait. [`ChannelSubscriber`] is the concrete handle
//! used by the SSE and WebSocket transports: a bounded channel whose
//! receiving half is drained by the connection task.

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::mpsc;

use super::{Event, SubscriberId};

/// Why a delivery attempt to a subscriber failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    /// The handle was already closing or closed.
    #[error("subscriber is closed")]
    Closed,

    /// The transport side of the handle has gone away.
    #[error("subscriber disconnected")]
    Disconnected,

    /// The subscriber did not accept the event within the delivery bound.
    #[error("delivery timed out after {0:?}")]
    Timeout(Duration),
}

/// Liveness of a subscriber handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriberState {
    /// Accepting deliveries.
    Active,
    /// A delivery failed or a lifecycle hook fired; eviction pending.
    Closing,
    /// Terminal. Never receives another delivery.
    Closed,
}

impl SubscriberState {
    const fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::Active,
            1 => Self::Closing,
            _ => Self::Closed,
        }
    }

    const fn as_u8(self) -> u8 {
        match self {
            Self::Active => 0,
            Self::Closing => 1,
            Self::Closed => 2,
        }
    }
}

impl fmt::Display for SubscriberState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Closing => write!(f, "closing"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

/// Push capability for one live delivery target.
///
/// Implementations are supplied by the transport layer. The registry
/// only stores shared references for membership; connection teardown
/// stays with the transport.
pub trait SubscriberHandle: fmt::Debug + Send + Sync + 'static {
    /// Stable identity used for registry membership.
    fn id(&self) -> SubscriberId;

    /// Attempts to push one event to the subscriber.
    ///
    /// # Errors
    ///
    /// Returns a [`DeliveryError`] when the handle is closed, its
    /// transport is gone, or the push did not complete in time.
    fn deliver(&self, event: &Event) -> impl Future<Output = Result<(), DeliveryError>> + Send;

    /// Marks the handle closed and releases its sink. Idempotent.
    fn close(&self);

    /// Current liveness state.
    fn state(&self) -> SubscriberState;

    /// Returns `true` while the handle accepts deliveries.
    fn is_active(&self) -> bool {
        self.state() == SubscriberState::Active
    }
}

/// Channel-backed [`SubscriberHandle`].
///
/// Deliveries are pushed into a bounded `mpsc` channel; a push that does
/// not complete within `delivery_timeout` fails with
/// [`DeliveryError::Timeout`], so a stalled client cannot hold up the
/// rest of a fan-out. Closing drops the sender, which ends the stream on
/// the receiving side once it has drained.
#[derive(Debug)]
pub struct ChannelSubscriber {
    id: SubscriberId,
    sender: Mutex<Option<mpsc::Sender<Event>>>,
    state: AtomicU8,
    delivery_timeout: Duration,
}

impl ChannelSubscriber {
    /// Creates a handle and the receiver the transport must drain.
    ///
    /// `buffer` is clamped to at least 1.
    #[must_use]
    pub fn new(buffer: usize, delivery_timeout: Duration) -> (Self, mpsc::Receiver<Event>) {
        let (sender, receiver) = mpsc::channel(buffer.max(1));
        let handle = Self {
            id: SubscriberId::new(),
            sender: Mutex::new(Some(sender)),
            state: AtomicU8::new(SubscriberState::Active.as_u8()),
            delivery_timeout,
        };
        (handle, receiver)
    }

    /// Per-delivery time bound.
    #[must_use]
    pub const fn delivery_timeout(&self) -> Duration {
        self.delivery_timeout
    }

    fn sender(&self) -> Option<mpsc::Sender<Event>> {
        self.sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Moves `Active` to `Closing`; leaves any other state untouched.
    fn begin_closing(&self) {
        let _ = self.state.compare_exchange(
            SubscriberState::Active.as_u8(),
            SubscriberState::Closing.as_u8(),
            Ordering::AcqRel,
            Ordering::Acquire,
        );
    }
}

impl SubscriberHandle for ChannelSubscriber {
    fn id(&self) -> SubscriberId {
        self.id
    }

    async fn deliver(&self, event: &Event) -> Result<(), DeliveryError> {
        if !self.is_active() {
            return Err(DeliveryError::Closed);
        }
        let Some(sender) = self.sender() else {
            return Err(DeliveryError::Closed);
        };

        let permit = match tokio::time::timeout(self.delivery_timeout, sender.reserve()).await {
            Ok(Ok(permit)) => permit,
            Ok(Err(_)) => {
                self.begin_closing();
                return Err(DeliveryError::Disconnected);
            }
            Err(_) => {
                self.begin_closing();
                return Err(DeliveryError::Timeout(self.delivery_timeout));
            }
        };

        // `close` flips the state before taking this lock, so a close that
        // raced the wait above is always seen here.
        let _slot = self.sender.lock().unwrap_or_else(PoisonError::into_inner);
        if !self.is_active() {
            return Err(DeliveryError::Closed);
        }
        permit.send(event.clone());
        Ok(())
    }

    fn close(&self) {
        self.state
            .store(SubscriberState::Closed.as_u8(), Ordering::Release);
        self.sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }

    fn state(&self) -> SubscriberState {
        SubscriberState::from_u8(self.state.load(Ordering::Acquire))
    }
}
