//! In-memory subscriber used by the domain unit tests.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use super::{DeliveryError, Event, SubscriberHandle, SubscriberId, SubscriberState};

/// Records every payload it accepts; can be told to fail or to stall.
#[derive(Debug)]
pub(crate) struct RecordingSubscriber {
    id: SubscriberId,
    received: Mutex<Vec<String>>,
    failing: AtomicBool,
    stall: Option<Duration>,
    state: AtomicU8,
}

impl RecordingSubscriber {
    pub(crate) fn healthy() -> Arc<Self> {
        Arc::new(Self::build(false, None))
    }

    pub(crate) fn failing() -> Arc<Self> {
        Arc::new(Self::build(true, None))
    }

    pub(crate) fn stalling(delay: Duration) -> Arc<Self> {
        Arc::new(Self::build(false, Some(delay)))
    }

    fn build(failing: bool, stall: Option<Duration>) -> Self {
        Self {
            id: SubscriberId::new(),
            received: Mutex::new(Vec::new()),
            failing: AtomicBool::new(failing),
            stall,
            state: AtomicU8::new(0),
        }
    }

    pub(crate) fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub(crate) fn received(&self) -> Vec<String> {
        self.received
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl SubscriberHandle for RecordingSubscriber {
    fn id(&self) -> SubscriberId {
        self.id
    }

    async fn deliver(&self, event: &Event) -> Result<(), DeliveryError> {
        if !self.is_active() {
            return Err(DeliveryError::Closed);
        }
        if let Some(delay) = self.stall {
            tokio::time::sleep(delay).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(DeliveryError::Disconnected);
        }
        self.received
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.payload_text());
        Ok(())
    }

    fn close(&self) {
        self.state.store(2, Ordering::SeqCst);
    }

    fn state(&self) -> SubscriberState {
        match self.state.load(Ordering::SeqCst) {
            0 => SubscriberState::Active,
            1 => SubscriberState::Closing,
            _ => SubscriberState::Closed,
        }
    }
}
