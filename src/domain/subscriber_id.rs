//! Type-safe subscriber identifier.
//!
//! [`SubscriberId`] wraps a [`uuid::Uuid`] (v4) so that subscriber
//! identities cannot be confused with other UUIDs flowing through the
//! gateway.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of one live subscriber connection.
///
/// Generated when the transport accepts a connection and used as the
/// membership key in [`super::SubscriptionRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriberId(uuid::Uuid);

impl SubscriberId {
    /// Creates a new random `SubscriberId` (UUID v4).
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for SubscriberId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
