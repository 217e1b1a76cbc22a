//! One user session
//!
//! A [`Session`] owns the shared context store, the event bus (already bridged
//! into the store), the module registry, the API client and the job poller.
//! Everything that needs session state receives the session by reference.

use crate::adapters::api::{ApiClient, JobStatusSource};
use crate::adapters::storage::{ContextStorage, JsonFileStorage};
use crate::config::CaredeskConfig;
use crate::core::context::{SharedContext, SharedContextStore, Transition};
use crate::core::events::{bridge_to_context, ContextBridge, EventBus, ResourceRef};
use crate::core::modules::{HostOutcome, ModuleHost, ModuleId, ModuleRegistry};
use crate::core::pages::{Page, PageState};
use crate::core::polling::{JobPoller, PollPolicy};
use crate::domain::Result;
use serde_json::Value;
use std::sync::{Arc, Mutex, PoisonError};

/// Session-scoped services
pub struct Session {
    store: Arc<SharedContextStore>,
    bus: EventBus,
    registry: Arc<ModuleRegistry>,
    api: ApiClient,
    poller: JobPoller,
    bridge: ContextBridge,
}

impl Session {
    /// Assemble a session from its parts and bridge the bus into the store
    pub fn new(
        store: Arc<SharedContextStore>,
        registry: ModuleRegistry,
        api: ApiClient,
        policy: PollPolicy,
    ) -> Self {
        let bus = EventBus::new();
        let bridge = bridge_to_context(&bus, Arc::clone(&store));
        let source: Arc<dyn JobStatusSource> = Arc::new(api.clone());

        Self {
            store,
            bus,
            registry: Arc::new(registry),
            api,
            poller: JobPoller::new(source, policy),
            bridge,
        }
    }

    /// Build a session from configuration, backed by the configured JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn open(config: &CaredeskConfig, registry: ModuleRegistry) -> Result<Self> {
        let storage: Arc<dyn ContextStorage> =
            Arc::new(JsonFileStorage::new(&config.session.storage_path));
        let store = Arc::new(SharedContextStore::open(
            storage,
            &config.session,
            &config.application.user_display,
        ));
        let api = ApiClient::new(&config.api)?;

        tracing::info!(
            api = api.base_url(),
            storage = %config.session.storage_path,
            "Session opened"
        );

        Ok(Self::new(
            store,
            registry,
            api,
            PollPolicy::from_config(&config.polling),
        ))
    }

    pub fn store(&self) -> &Arc<SharedContextStore> {
        &self.store
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn poller(&self) -> &JobPoller {
        &self.poller
    }

    /// Current shared context
    pub fn context(&self) -> Arc<SharedContext> {
        self.store.get_state()
    }

    pub fn dispatch(&self, transition: Transition) -> Arc<SharedContext> {
        self.store.dispatch(transition)
    }

    pub fn host(&self) -> ModuleHost<'_> {
        ModuleHost::new(&self.registry)
    }

    /// Last resource selected through the bus
    pub fn selected_resource(&self) -> Option<ResourceRef> {
        self.bridge.selected_resource()
    }

    /// Render every slot of `page`, then apply the outputs the modules emitted
    ///
    /// Outputs are collected while the page renders and handled afterwards, in
    /// slot order, so a module never sees the context change under it mid-render.
    pub fn render_page(&self, page: Page, state: &mut PageState) -> Vec<HostOutcome> {
        let shared = self.context();
        let host = self.host();
        let mut outcomes = Vec::new();
        let mut emitted: Vec<(ModuleId, Value)> = Vec::new();

        for slot in page.slots_with(&shared, state) {
            let outputs = Mutex::new(Vec::new());
            let sink = |value: Value| {
                outputs
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(value)
            };
            outcomes.push(host.render(slot.module, &slot.context, slot.inputs.as_ref(), Some(&sink)));

            let outputs = outputs.into_inner().unwrap_or_else(PoisonError::into_inner);
            emitted.extend(outputs.into_iter().map(|value| (slot.module, value)));
        }

        for (module, output) in emitted {
            for transition in page.handle_output(module, &output, state) {
                self.store.dispatch(transition);
            }
        }

        outcomes
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.bridge.disconnect();
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("store", &self.store)
            .field("api", &self.api.base_url())
            .field("bus_subscribers", &self.bus.subscriber_count())
            .finish()
    }
}
