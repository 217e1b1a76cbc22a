//! Event bus to shared context bridge
//!
//! | Event | Effect |
//! |---|---|
//! | `JobIdChanged` | `SetJob` |
//! | `PreAuthIdChanged` | `SetPreAuth` |
//! | `EncounterIdChanged` | `SetEncounter` |
//! | `EntitySelected` | remembered as the selected resource |

use super::bus::{AppEvent, EventBus, ResourceRef};
use super::listeners::Subscription;
use crate::core::context::{SharedContextStore, Transition};
use std::sync::{Arc, Mutex, PoisonError};

/// Live bridge; dropping it stops forwarding events
#[derive(Debug)]
pub struct ContextBridge {
    selected: Arc<Mutex<Option<ResourceRef>>>,
    subscription: Subscription,
}

impl ContextBridge {
    /// Resource most recently selected through an `EntitySelected` event
    pub fn selected_resource(&self) -> Option<ResourceRef> {
        self.selected
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Stop forwarding events
    pub fn disconnect(&self) {
        self.subscription.unsubscribe();
    }
}

/// Forward id-change events from `bus` into `store`
pub fn bridge_to_context(bus: &EventBus, store: Arc<SharedContextStore>) -> ContextBridge {
    let selected: Arc<Mutex<Option<ResourceRef>>> = Arc::new(Mutex::new(None));
    let selected_slot = Arc::clone(&selected);

    let subscription = bus.subscribe(move |event| {
        let transition = match event {
            AppEvent::JobIdChanged { job_id } => Transition::SetJob(job_id.clone()),
            AppEvent::PreAuthIdChanged { pre_auth_id } => {
                Transition::SetPreAuth(pre_auth_id.clone())
            }
            AppEvent::EncounterIdChanged { encounter_id } => {
                Transition::SetEncounter(encounter_id.clone())
            }
            AppEvent::EntitySelected(resource) => {
                tracing::debug!(resource = %resource, "Resource selected");
                *selected_slot.lock().unwrap_or_else(PoisonError::into_inner) =
                    Some(resource.clone());
                return;
            }
        };
        store.dispatch(transition);
    });

    ContextBridge {
        selected,
        subscription,
    }
}
