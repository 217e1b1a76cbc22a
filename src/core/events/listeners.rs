//! Ordered listener registry shared by the event bus and the context store
//!
//! Delivery takes a snapshot of the registered callbacks before invoking any of
//! them, so a callback may subscribe or unsubscribe (itself included) without
//! affecting the pass in progress. The registry lock is never held while a
//! callback runs.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Registry<T> {
    next_id: AtomicU64,
    entries: Mutex<Vec<(u64, Callback<T>)>>,
}

impl<T> Registry<T> {
    fn entries(&self) -> MutexGuard<'_, Vec<(u64, Callback<T>)>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn remove(&self, id: u64) -> bool {
        let mut entries = self.entries();
        let before = entries.len();
        entries.retain(|(entry_id, _)| *entry_id != id);
        entries.len() != before
    }
}

/// Callbacks in registration order
pub struct ListenerSet<T> {
    registry: Arc<Registry<T>>,
}

impl<T> Clone for ListenerSet<T> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<T> Default for ListenerSet<T> {
    fn default() -> Self {
        Self {
            registry: Arc::new(Registry {
                next_id: AtomicU64::new(0),
                entries: Mutex::new(Vec::new()),
            }),
        }
    }
}

impl<T: 'static> ListenerSet<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback; it stays registered until the returned
    /// [`Subscription`] is unsubscribed or dropped
    pub fn subscribe(&self, callback: impl Fn(&T) + Send + Sync + 'static) -> Subscription {
        let id = self.registry.next_id.fetch_add(1, Ordering::Relaxed);
        self.registry.entries().push((id, Arc::new(callback)));

        let registry: Weak<Registry<T>> = Arc::downgrade(&self.registry);
        Subscription::new(move || {
            registry
                .upgrade()
                .map(|registry| registry.remove(id))
                .unwrap_or(false)
        })
    }

    /// Invoke every callback registered at the time of the call, in order
    ///
    /// Returns the number of callbacks invoked.
    pub fn notify(&self, value: &T) -> usize {
        let snapshot: Vec<Callback<T>> = self
            .registry
            .entries()
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect();

        for callback in &snapshot {
            callback(value);
        }

        snapshot.len()
    }

    pub fn len(&self) -> usize {
        self.registry.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

type Remover = Box<dyn FnOnce() -> bool + Send>;

/// Handle to a registered listener
///
/// Dropping the handle unsubscribes. Call [`Subscription::detach`] to keep the
/// listener for the lifetime of its registry instead.
#[must_use = "dropping a Subscription unsubscribes the listener immediately"]
pub struct Subscription {
    remover: Mutex<Option<Remover>>,
}

impl Subscription {
    fn new(remover: impl FnOnce() -> bool + Send + 'static) -> Self {
        Self {
            remover: Mutex::new(Some(Box::new(remover))),
        }
    }

    /// Remove the listener; later calls are no-ops
    ///
    /// Returns `true` only for the call that actually removed it.
    pub fn unsubscribe(&self) -> bool {
        let remover = self
            .remover
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        remover.map(|remove| remove()).unwrap_or(false)
    }

    /// True until the listener has been removed through this handle
    pub fn is_active(&self) -> bool {
        self.remover
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Keep the listener registered and discard the handle
    pub fn detach(self) {
        self.remover
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}
