//! Shared context store
//!
//! One mutable record per session. Every change goes through
//! [`SharedContextStore::dispatch`], which:
//!
//! 1. applies the transition under the store lock,
//! 2. persists the new state (best-effort),
//! 3. queues the new state for delivery to subscribers.
//!
//! Delivery drains the queue outside the lock, one state at a time, on
//! whichever thread found the queue idle. Every subscriber therefore sees the
//! same sequence of states, and a subscriber may dispatch again from inside its
//! callback; the nested state is delivered after the current one finishes.

use super::persisted::{encode, PersistedContext};
use super::state::{reduce, SharedContext, Transition};
use crate::adapters::storage::ContextStorage;
use crate::config::SessionConfig;
use crate::core::events::{ListenerSet, Subscription};
use crate::domain::CorrelationId;
use crate::log_transition;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

struct StoreInner {
    state: Arc<SharedContext>,
    pending: VecDeque<Arc<SharedContext>>,
    delivering: bool,
}

/// Single source of truth for the session's working entities
pub struct SharedContextStore {
    inner: Mutex<StoreInner>,
    listeners: ListenerSet<Arc<SharedContext>>,
    storage: Arc<dyn ContextStorage>,
    storage_key: String,
    default_user_display: String,
}

impl SharedContextStore {
    /// Rehydrate the store from durable storage
    ///
    /// Missing or unreadable records start a fresh session with a generated
    /// correlation id; storage problems are logged, never returned.
    ///
    /// # Example
    ///
    /// ```
    /// use caredesk::adapters::storage::MemoryStorage;
    /// use caredesk::config::SessionConfig;
    /// use caredesk::core::context::{SharedContextStore, Transition};
    /// use caredesk::domain::EntityId;
    /// use std::sync::Arc;
    ///
    /// let store = SharedContextStore::open(
    ///     Arc::new(MemoryStorage::new()),
    ///     &SessionConfig::default(),
    ///     "Dr. Sample User",
    /// );
    /// let state = store.dispatch(Transition::SetPatient(EntityId::new("pat-1").ok()));
    /// assert_eq!(state.patient_id.as_ref().map(|id| id.as_str()), Some("pat-1"));
    /// ```
    pub fn open(
        storage: Arc<dyn ContextStorage>,
        session: &SessionConfig,
        default_user_display: &str,
    ) -> Self {
        let persisted = match storage.load(&session.storage_key) {
            Ok(Some(raw)) => PersistedContext::decode(&raw),
            Ok(None) => PersistedContext::default(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read stored context, starting fresh");
                PersistedContext::default()
            }
        };
        let state = persisted.into_context(default_user_display);

        tracing::debug!(
            patient_id = ?state.patient_id,
            correlation_id = %state.correlation_id,
            "Shared context loaded"
        );

        Self {
            inner: Mutex::new(StoreInner {
                state: Arc::new(state),
                pending: VecDeque::new(),
                delivering: false,
            }),
            listeners: ListenerSet::new(),
            storage,
            storage_key: session.storage_key.clone(),
            default_user_display: default_user_display.to_string(),
        }
    }

    /// Current snapshot
    pub fn get_state(&self) -> Arc<SharedContext> {
        Arc::clone(&self.lock().state)
    }

    /// Apply one transition and return the resulting state
    ///
    /// A no-op transition returns the current `Arc` unchanged and notifies no
    /// one.
    pub fn dispatch(&self, transition: Transition) -> Arc<SharedContext> {
        let name = transition.name();
        let (next, deliver) = {
            let mut inner = self.lock();
            let next = reduce(&inner.state, transition);
            if Arc::ptr_eq(&next, &inner.state) {
                log_transition!(name, false);
                return next;
            }

            inner.state = Arc::clone(&next);
            self.persist(&next);
            log_transition!(name, true);
            (next, self.enqueue(&mut inner))
        };

        if deliver {
            self.drain();
        }
        next
    }

    /// Register a callback invoked with every new state
    pub fn subscribe(
        &self,
        listener: impl Fn(&Arc<SharedContext>) + Send + Sync + 'static,
    ) -> Subscription {
        self.listeners.subscribe(listener)
    }

    /// Administrative reset: forget all working entities and start a new
    /// correlation id
    pub fn reset_to_defaults(&self) -> Arc<SharedContext> {
        let next = Arc::new(SharedContext::new(
            CorrelationId::generate(),
            self.default_user_display.as_str(),
        ));

        let deliver = {
            let mut inner = self.lock();
            inner.state = Arc::clone(&next);
            if let Err(e) = self.storage.remove(&self.storage_key) {
                tracing::warn!(error = %e, "Failed to clear stored context");
            }
            tracing::info!(correlation_id = %next.correlation_id, "Shared context reset");
            self.enqueue(&mut inner)
        };

        if deliver {
            self.drain();
        }
        next
    }

    fn lock(&self) -> MutexGuard<'_, StoreInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue the current state; true if the caller must drain
    fn enqueue(&self, inner: &mut StoreInner) -> bool {
        let state = Arc::clone(&inner.state);
        inner.pending.push_back(state);
        if inner.delivering {
            false
        } else {
            inner.delivering = true;
            true
        }
    }

    fn drain(&self) {
        loop {
            let state = {
                let mut inner = self.lock();
                match inner.pending.pop_front() {
                    Some(state) => state,
                    None => {
                        inner.delivering = false;
                        return;
                    }
                }
            };
            self.listeners.notify(&state);
        }
    }

    fn persist(&self, state: &SharedContext) {
        let result = encode(state).and_then(|raw| self.storage.save(&self.storage_key, &raw));
        if let Err(e) = result {
            tracing::warn!(error = %e, "Failed to persist shared context");
        }
    }
}

impl std::fmt::Debug for SharedContextStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedContextStore")
            .field("state", &self.get_state())
            .field("storage_key", &self.storage_key)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::MemoryStorage;
    use crate::domain::{CaredeskError, EntityId, Result};

    struct FailingStorage;

    impl ContextStorage for FailingStorage {
        fn load(&self, _key: &str) -> Result<Option<String>> {
            Err(CaredeskError::Storage("unavailable".to_string()))
        }
        fn save(&self, _key: &str, _value: &str) -> Result<()> {
            Err(CaredeskError::Storage("quota exceeded".to_string()))
        }
        fn remove(&self, _key: &str) -> Result<()> {
            Err(CaredeskError::Storage("unavailable".to_string()))
        }
    }

    fn id(value: &str) -> Option<EntityId> {
        EntityId::new(value).ok()
    }

    fn memory_store() -> (Arc<MemoryStorage>, SharedContextStore) {
        let storage = Arc::new(MemoryStorage::new());
        let store = SharedContextStore::open(
            storage.clone(),
            &SessionConfig::default(),
            "Dr. Sample User",
        );
        (storage, store)
    }

    #[test]
    fn test_fresh_session_defaults() {
        let (_, store) = memory_store();
        let state = store.get_state();
        assert!(state.correlation_id.as_str().starts_with("ui-"));
        assert_eq!(state.user_display, "Dr. Sample User");
        assert_eq!(state.patient_id, None);
    }

    #[test]
    fn test_noop_does_not_notify() {
        let (_, store) = memory_store();
        store.dispatch(Transition::SetPatient(id("pat-1")));

        let calls = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&calls);
        let _sub = store.subscribe(move |_| *counter.lock().unwrap() += 1);

        let before = store.get_state();
        let after = store.dispatch(Transition::SetPatient(id("pat-1")));
        assert!(Arc::ptr_eq(&before, &after));
        assert_eq!(*calls.lock().unwrap(), 0);

        store.dispatch(Transition::SetEncounter(id("enc-1")));
        assert_eq!(*calls.lock().unwrap(), 1);
    }

    #[test]
    fn test_every_change_is_persisted() {
        let (storage, store) = memory_store();
        store.dispatch(Transition::SetPatient(id("pat-1")));
        store.dispatch(Transition::SetJob(id("job-1")));

        let raw = storage.load("ehr.ui.context.v1").unwrap().unwrap();
        let restored = PersistedContext::decode(&raw);
        assert_eq!(restored.patient_id, id("pat-1"));
        assert_eq!(restored.job_id, id("job-1"));
    }

    #[test]
    fn test_persist_failure_is_swallowed() {
        let store =
            SharedContextStore::open(Arc::new(FailingStorage), &SessionConfig::default(), "Dr. X");
        let state = store.dispatch(Transition::SetPatient(id("pat-1")));
        assert_eq!(state.patient_id, id("pat-1"));
        assert_eq!(store.get_state().patient_id, id("pat-1"));
        assert_eq!(store.reset_to_defaults().patient_id, None);
    }

    #[test]
    fn test_reentrant_dispatch_keeps_order() {
        let (_, store) = memory_store();
        let store = Arc::new(store);
        let seen: Arc<Mutex<Vec<Option<EntityId>>>> = Arc::new(Mutex::new(Vec::new()));

        // First subscriber reacts to a patient change by selecting an encounter.
        let weak = Arc::downgrade(&store);
        let _reactor = store.subscribe(move |state| {
            if state.patient_id.is_some() && state.encounter_id.is_none() {
                if let Some(store) = weak.upgrade() {
                    store.dispatch(Transition::SetEncounter(id("enc-auto")));
                }
            }
        });

        let log = Arc::clone(&seen);
        let _observer = store.subscribe(move |state| log.lock().unwrap().push(state.encounter_id.clone()));

        store.dispatch(Transition::SetPatient(id("pat-1")));

        assert_eq!(*seen.lock().unwrap(), vec![None, id("enc-auto")]);
        assert_eq!(store.get_state().encounter_id, id("enc-auto"));
    }

    #[test]
    fn test_reset_clears_storage_and_notifies() {
        let (storage, store) = memory_store();
        store.dispatch(Transition::SetPatient(id("pat-1")));
        let old_correlation = store.get_state().correlation_id.clone();

        let notified = Arc::new(Mutex::new(false));
        let flag = Arc::clone(&notified);
        let _sub = store.subscribe(move |_| *flag.lock().unwrap() = true);

        let state = store.reset_to_defaults();
        assert_eq!(state.patient_id, None);
        assert_ne!(state.correlation_id, old_correlation);
        assert!(*notified.lock().unwrap());
        assert_eq!(storage.load("ehr.ui.context.v1").unwrap(), None);
    }
}
