//! Integration tests for the event bus and its bridge into the shared context

use caredesk::adapters::storage::MemoryStorage;
use caredesk::config::SessionConfig;
use caredesk::core::context::{SharedContextStore, Transition};
use caredesk::core::events::{bridge_to_context, AppEvent, EventBus, ResourceRef};
use caredesk::domain::EntityId;
use std::sync::{Arc, Mutex};

fn id(value: &str) -> Option<EntityId> {
    EntityId::new(value).ok()
}

fn store() -> Arc<SharedContextStore> {
    Arc::new(SharedContextStore::open(
        Arc::new(MemoryStorage::new()),
        &SessionConfig::default(),
        "Dr. Sample User",
    ))
}

#[test]
fn test_events_without_listeners_are_dropped() {
    let bus = EventBus::new();
    assert_eq!(bus.publish(&AppEvent::JobIdChanged { job_id: id("job-1") }), 0);

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let _subscription = bus.subscribe(move |event| sink.lock().unwrap().push(event.kind()));

    assert!(seen.lock().unwrap().is_empty());
}

#[test]
fn test_delivery_follows_subscription_order() {
    let bus = EventBus::new();
    let order = Arc::new(Mutex::new(Vec::new()));

    let subscriptions: Vec<_> = ["first", "second", "third"]
        .into_iter()
        .map(|name| {
            let order = Arc::clone(&order);
            bus.subscribe(move |_| order.lock().unwrap().push(name))
        })
        .collect();

    assert_eq!(bus.publish(&AppEvent::EncounterIdChanged { encounter_id: None }), 3);
    assert_eq!(order.lock().unwrap().as_slice(), &["first", "second", "third"]);

    subscriptions[1].unsubscribe();
    order.lock().unwrap().clear();
    bus.publish(&AppEvent::EncounterIdChanged { encounter_id: None });
    assert_eq!(order.lock().unwrap().as_slice(), &["first", "third"]);
}

#[test]
fn test_bridge_forwards_id_changes() {
    let bus = EventBus::new();
    let store = store();
    let bridge = bridge_to_context(&bus, Arc::clone(&store));

    store.dispatch(Transition::SetPatient(id("pat-1")));
    bus.publish(&AppEvent::EncounterIdChanged { encounter_id: id("enc-1") });
    bus.publish(&AppEvent::PreAuthIdChanged { pre_auth_id: id("pa-1") });
    bus.publish(&AppEvent::JobIdChanged { job_id: id("job-1") });

    let state = store.get_state();
    assert_eq!(state.patient_id, id("pat-1"));
    assert_eq!(state.encounter_id, id("enc-1"));
    assert_eq!(state.pre_auth_id, id("pa-1"));
    assert_eq!(state.job_id, id("job-1"));

    bus.publish(&AppEvent::EntitySelected(ResourceRef {
        resource_type: "Condition".to_string(),
        id: EntityId::new("cond-1").unwrap(),
    }));
    assert_eq!(
        bridge.selected_resource().map(|r| r.to_string()).as_deref(),
        Some("Condition/cond-1")
    );
    assert_eq!(store.get_state().job_id, id("job-1"));
}

#[test]
fn test_disconnected_bridge_ignores_events() {
    let bus = EventBus::new();
    let store = store();
    let bridge = bridge_to_context(&bus, Arc::clone(&store));

    bridge.disconnect();
    bus.publish(&AppEvent::JobIdChanged { job_id: id("job-1") });

    assert_eq!(store.get_state().job_id, None);
    assert_eq!(bus.subscriber_count(), 0);
}

#[test]
fn test_context_listener_can_publish_without_deadlock() {
    let bus = EventBus::new();
    let store = store();
    let _bridge = bridge_to_context(&bus, Arc::clone(&store));

    // Announce every new pre-auth as a job reset, the way a page would
    let announcer = bus.clone();
    let last_pre_auth = Arc::new(Mutex::new(None));
    let seen = Arc::clone(&last_pre_auth);
    let _subscription = store.subscribe(move |state| {
        let mut seen = seen.lock().unwrap();
        if *seen != state.pre_auth_id {
            *seen = state.pre_auth_id.clone();
            drop(seen);
            announcer.publish(&AppEvent::JobIdChanged { job_id: None });
        }
    });

    store.dispatch(Transition::SetJob(id("job-1")));
    store.dispatch(Transition::SetPreAuth(id("pa-2")));

    let state = store.get_state();
    assert_eq!(state.pre_auth_id, id("pa-2"));
    assert_eq!(state.job_id, None);
}
