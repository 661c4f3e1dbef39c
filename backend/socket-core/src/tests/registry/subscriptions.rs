use crate::registry::SubscriptionRegistry;

use common::StatusCode;
use models::{EventName, ResponseEnvelope};

use std::sync::{Arc, Mutex};

use serde_json::json;

fn event(name: &str) -> EventName {
    EventName::parse(name).expect("valid event")
}

fn envelope() -> ResponseEnvelope {
    ResponseEnvelope {
        status: StatusCode::OK,
        payload: json!(1),
    }
}

/// **VALUE**: Verifies handler ids are never reused after removal.
///
/// **WHY THIS MATTERS**: A component that unsubscribes with a stale id must not
/// remove a handler that some other component registered later.
///
/// **BUG THIS CATCHES**: Would catch id allocation based on the current maximum.
#[test]
fn given_removed_last_handler_when_adding_again_then_id_is_not_reused() {
    // GIVEN: Two handlers, the newest removed
    let mut registry = SubscriptionRegistry::new();
    let first = registry.add(event("A"), |_| {});
    let second = registry.add(event("A"), |_| {});
    assert!(registry.remove(second));

    // WHEN: Adding another
    let third = registry.add(event("A"), |_| {});

    // THEN: Fresh, increasing id
    assert!(first < second);
    assert!(second < third);
    assert_eq!(registry.len(), 2);
}

#[test]
fn given_unknown_id_when_removing_then_is_noop() {
    let mut registry = SubscriptionRegistry::new();
    let id = registry.add(event("A"), |_| {});
    assert!(registry.remove(id));

    assert!(!registry.remove(id));
    assert!(registry.is_empty());
}

/// **VALUE**: Verifies lookup returns handlers in registration order.
///
/// **WHY THIS MATTERS**: Several UI stores often subscribe to one broadcast and
/// some depend on running after others.
///
/// **BUG THIS CATCHES**: Would catch storage that loses insertion order.
#[test]
fn given_handlers_for_event_when_looking_up_then_returns_registration_order() {
    // GIVEN: Handlers recording their position
    let calls = Arc::new(Mutex::new(Vec::new()));
    let mut registry = SubscriptionRegistry::new();
    for position in 1..=3 {
        let calls = Arc::clone(&calls);
        registry.add(event("STATS"), move |_| {
            calls.lock().expect("calls lock").push(position);
        });
    }
    registry.add(event("OTHER"), |_| panic!("wrong event"));

    // WHEN: Invoking every handler for STATS
    for handler in registry.lookup("STATS") {
        handler(&envelope());
    }

    // THEN: Registration order
    assert_eq!(*calls.lock().expect("calls lock"), vec![1, 2, 3]);
}

#[test]
fn given_mixed_events_when_removing_all_for_one_then_others_remain() {
    let mut registry = SubscriptionRegistry::new();
    registry.add(event("A"), |_| {});
    registry.add(event("A"), |_| {});
    registry.add(event("B"), |_| {});

    let removed = registry.remove_all(Some("A"));

    assert_eq!(removed, 2);
    assert!(registry.lookup("A").is_empty());
    assert_eq!(registry.lookup("B").len(), 1);
}

#[test]
fn given_handlers_when_removing_all_without_event_then_registry_is_empty() {
    let mut registry = SubscriptionRegistry::new();
    registry.add(event("A"), |_| {});
    registry.add(event("B"), |_| {});

    let removed = registry.remove_all(None);

    assert_eq!(removed, 2);
    assert!(registry.is_empty());
}

#[test]
fn given_no_handlers_when_looking_up_then_returns_empty() {
    let registry = SubscriptionRegistry::new();

    assert!(registry.lookup("NOBODY").is_empty());
}
