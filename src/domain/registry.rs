//! Concurrent subscriber membership with copy-on-write snapshots.
//!
//! [`SubscriptionRegistry`] keeps live handles in an `Arc<HashMap<...>>`
//! behind a [`std::sync::RwLock`]. Readers clone the `Arc` and iterate
//! without holding the lock; writers swap in a modified map. A slow
//! delivery therefore never blocks registration, and registration never
//! mutates a map somebody is iterating.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{ChannelSubscriber, SubscriberHandle, SubscriberId};

type HandleMap<H> = HashMap<SubscriberId, Arc<H>>;

/// Set of live subscriber handles, keyed by [`SubscriberId`].
///
/// # Concurrency
///
/// - `add`, `remove` and `snapshot` may be called from any task.
/// - The lock is held only to clone or replace the inner `Arc`, never
///   across an `.await`.
/// - Both `add` and `remove` are idempotent.
#[derive(Debug)]
pub struct SubscriptionRegistry<H: SubscriberHandle = ChannelSubscriber> {
    handles: RwLock<Arc<HandleMap<H>>>,
}

impl<H: SubscriberHandle> SubscriptionRegistry<H> {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            handles: RwLock::new(Arc::new(HashMap::new())),
        }
    }

    /// Registers a handle.
    ///
    /// Returns `false` without changing membership if the handle is
    /// already present or is no longer active.
    pub fn add(&self, handle: Arc<H>) -> bool {
        let id = handle.id();
        let mut map = self.write();
        // Evictions close before they remove, so checking under the lock
        // keeps a handle closed mid-add out of the map.
        if !handle.is_active() || map.contains_key(&id) {
            return false;
        }
        Arc::make_mut(&mut *map).insert(id, handle);
        true
    }

    /// Unregisters a handle. Returns `true` if it was present.
    pub fn remove(&self, id: SubscriberId) -> bool {
        let mut map = self.write();
        if !map.contains_key(&id) {
            return false;
        }
        Arc::make_mut(&mut *map).remove(&id).is_some()
    }

    /// Returns a consistent point-in-time view of the registered handles.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot<H> {
        Snapshot {
            handles: Arc::clone(&self.read()),
        }
    }

    /// Returns `true` if a handle with the given ID is registered.
    #[must_use]
    pub fn contains(&self, id: SubscriberId) -> bool {
        self.read().contains_key(&id)
    }

    /// Returns the number of registered handles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Returns `true` if no handles are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> RwLockReadGuard<'_, Arc<HandleMap<H>>> {
        self.handles.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Arc<HandleMap<H>>> {
        self.handles.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<H: SubscriberHandle> Default for SubscriptionRegistry<H> {
    fn default() -> Self {
        Self::new()
    }
}

/// Immutable view of a registry taken by [`SubscriptionRegistry::snapshot`].
///
/// Later `add`/`remove` calls on the registry are not reflected here.
#[derive(Debug)]
pub struct Snapshot<H: SubscriberHandle> {
    handles: Arc<HandleMap<H>>,
}

impl<H: SubscriberHandle> Snapshot<H> {
    /// Iterates the handles in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<H>> {
        self.handles.values()
    }

    /// Returns `true` if the snapshot contains the given ID.
    #[must_use]
    pub fn contains(&self, id: SubscriberId) -> bool {
        self.handles.contains_key(&id)
    }

    /// Number of handles in the snapshot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Returns `true` if the snapshot is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::test_support::RecordingSubscriber;

    #[test]
    fn add_is_idempotent() {
        let registry = SubscriptionRegistry::new();
        let a = RecordingSubscriber::healthy();

        assert!(registry.add(Arc::clone(&a)));
        assert!(!registry.add(Arc::clone(&a)));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn remove_twice_equals_once() {
        let registry = SubscriptionRegistry::new();
        let a = RecordingSubscriber::healthy();
        let b = RecordingSubscriber::healthy();
        registry.add(Arc::clone(&a));
        registry.add(Arc::clone(&b));

        assert!(registry.remove(a.id()));
        assert!(!registry.remove(a.id()));
        assert!(!registry.contains(a.id()));
        assert!(registry.contains(b.id()));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn remove_absent_is_noop() {
        let registry = SubscriptionRegistry::<RecordingSubscriber>::new();
        assert!(!registry.remove(SubscriberId::new()));
        assert!(registry.is_empty());
    }

    #[test]
    fn closed_handle_is_rejected() {
        let registry = SubscriptionRegistry::new();
        let a = RecordingSubscriber::healthy();
        a.close();

        assert!(!registry.add(a));
        assert!(registry.is_empty());
    }

    #[test]
    fn add_racing_eviction_never_leaves_closed_handle() {
        let registry = SubscriptionRegistry::<RecordingSubscriber>::new();
        for _ in 0..500 {
            let handle = RecordingSubscriber::healthy();
            let barrier = std::sync::Barrier::new(2);
            std::thread::scope(|scope| {
                scope.spawn(|| {
                    barrier.wait();
                    registry.add(Arc::clone(&handle));
                });
                scope.spawn(|| {
                    barrier.wait();
                    handle.close();
                    registry.remove(handle.id());
                });
            });
            assert!(!registry.contains(handle.id()));
        }
        assert!(registry.is_empty());
    }

    #[test]
    fn snapshot_is_isolated_from_later_mutation() {
        let registry = SubscriptionRegistry::new();
        let a = RecordingSubscriber::healthy();
        let b = RecordingSubscriber::healthy();
        registry.add(Arc::clone(&a));

        let snapshot = registry.snapshot();
        registry.add(Arc::clone(&b));
        registry.remove(a.id());

        assert_eq!(snapshot.len(), 1);
        assert!(snapshot.contains(a.id()));
        assert!(!snapshot.contains(b.id()));
        assert_eq!(registry.len(), 1);
        assert!(registry.contains(b.id()));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_mutation_during_iteration() {
        let registry = Arc::new(SubscriptionRegistry::new());
        let handles: Vec<_> = (0..64).map(|_| RecordingSubscriber::healthy()).collect();

        let mut tasks = Vec::new();
        for handle in handles.iter().cloned() {
            let registry = Arc::clone(&registry);
            tasks.push(tokio::spawn(async move {
                registry.add(Arc::clone(&handle));
                let snapshot = registry.snapshot();
                let seen = snapshot.iter().count();
                registry.remove(handle.id());
                registry.remove(handle.id());
                seen
            }));
        }

        for task in tasks {
            let Ok(seen) = task.await else {
                panic!("task panicked");
            };
            assert!(seen >= 1);
        }
        assert!(registry.is_empty());
    }
}
