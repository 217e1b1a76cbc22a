//! Publish/subscribe channel for cross-module events

use super::listeners::{ListenerSet, Subscription};
use crate::domain::EntityId;
use serde::Serialize;
use std::fmt;

/// Reference to a clinical resource picked in a list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceRef {
    pub resource_type: String,
    pub id: EntityId,
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.resource_type, self.id)
    }
}

/// Events that cross module boundaries
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// A resource was selected in the timeline
    EntitySelected(ResourceRef),
    JobIdChanged { job_id: Option<EntityId> },
    PreAuthIdChanged { pre_auth_id: Option<EntityId> },
    EncounterIdChanged { encounter_id: Option<EntityId> },
}

impl AppEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            AppEvent::EntitySelected(_) => "entity_selected",
            AppEvent::JobIdChanged { .. } => "job_id_changed",
            AppEvent::PreAuthIdChanged { .. } => "pre_auth_id_changed",
            AppEvent::EncounterIdChanged { .. } => "encounter_id_changed",
        }
    }
}

/// Process-local event bus
///
/// Delivery is synchronous and follows subscription order. Nothing is queued:
/// an event published while nobody listens is dropped. Clones share the same
/// set of listeners.
///
/// # Example
///
/// ```
/// use caredesk::core::events::{AppEvent, EventBus};
/// use caredesk::domain::EntityId;
///
/// let bus = EventBus::new();
/// let subscription = bus.subscribe(|event| println!("got {}", event.kind()));
///
/// bus.publish(&AppEvent::JobIdChanged { job_id: EntityId::new("job-1").ok() });
/// subscription.unsubscribe();
/// ```
#[derive(Clone, Default)]
pub struct EventBus {
    listeners: ListenerSet<AppEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver `event` to every current subscriber; returns how many received it
    pub fn publish(&self, event: &AppEvent) -> usize {
        let delivered = self.listeners.notify(event);
        tracing::trace!(kind = event.kind(), delivered, "Event published");
        delivered
    }

    pub fn subscribe(&self, listener: impl Fn(&AppEvent) + Send + Sync + 'static) -> Subscription {
        self.listeners.subscribe(listener)
    }

    pub fn subscriber_count(&self) -> usize {
        self.listeners.len()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
