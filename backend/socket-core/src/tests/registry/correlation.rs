use crate::error::{ClientError, CorrelationError};
use crate::registry::CorrelationRegistry;

use common::StatusCode;
use models::{EventName, RequestId, ResponseEnvelope};

use serde_json::json;

fn request_id(seed: char) -> RequestId {
    RequestId::parse(seed.to_string().repeat(RequestId::LEN)).expect("valid request id")
}

fn event(name: &str) -> EventName {
    EventName::parse(name).expect("valid event")
}

fn ok_envelope() -> ResponseEnvelope {
    ResponseEnvelope {
        status: StatusCode::OK,
        payload: json!({ "done": true }),
    }
}

/// **VALUE**: Verifies that a waiter is consumed exactly once.
///
/// **WHY THIS MATTERS**: A duplicated response must not resolve a request twice;
/// the second copy falls through to event handlers instead.
///
/// **BUG THIS CATCHES**: Would catch if `take` leaves the entry in place.
#[test]
fn given_registered_request_when_taking_twice_then_second_take_is_none() {
    // GIVEN: One registered request
    let mut registry = CorrelationRegistry::new();
    let id = request_id('a');
    let _receiver = registry
        .register(id.clone(), event("LOG__GET"), 1)
        .expect("registers");

    // WHEN: Taking twice
    let first = registry.take(&id);
    let second = registry.take(&id);

    // THEN: Only the first take finds it
    assert_eq!(first.map(|request| request.event().clone()), Some(event("LOG__GET")));
    assert!(second.is_none());
    assert!(registry.is_empty());
}

/// **VALUE**: Verifies that a colliding request id is refused, not overwritten.
///
/// **WHY THIS MATTERS**: Overwriting would orphan the first caller, who then waits
/// forever while the second caller gets the first caller's response.
///
/// **BUG THIS CATCHES**: Would catch if `register` silently replaces an entry.
#[test]
fn given_outstanding_id_when_registering_again_then_returns_duplicate_error() {
    // GIVEN: An outstanding request
    let mut registry = CorrelationRegistry::new();
    let id = request_id('b');
    let _receiver = registry
        .register(id.clone(), event("FIRST"), 1)
        .expect("registers");

    // WHEN: Registering the same id again
    let result = registry.register(id.clone(), event("SECOND"), 1);

    // THEN: Refused, original untouched
    assert!(matches!(
        result,
        Err(CorrelationError::DuplicateRequestId { .. })
    ));
    assert_eq!(registry.len(), 1);
    let original = registry.take(&id).expect("original kept");
    assert_eq!(original.event(), &event("FIRST"));
}

#[tokio::test]
async fn given_registered_request_when_resolved_then_receiver_gets_envelope() {
    let mut registry = CorrelationRegistry::new();
    let id = request_id('c');
    let receiver = registry
        .register(id.clone(), event("SAVE"), 1)
        .expect("registers");

    let delivered = registry.take(&id).expect("registered").resolve(ok_envelope());

    assert!(delivered);
    let result = receiver.await.expect("sender completed");
    assert_eq!(result.expect("resolved"), ok_envelope());
}

#[tokio::test]
async fn given_registered_request_when_rejected_then_receiver_gets_error() {
    let mut registry = CorrelationRegistry::new();
    let id = request_id('d');
    let receiver = registry
        .register(id.clone(), event("SAVE"), 1)
        .expect("registers");

    registry
        .take(&id)
        .expect("registered")
        .reject(ClientError::connection_closed("gone"));

    let result = receiver.await.expect("sender completed");
    assert!(matches!(result, Err(ClientError::ConnectionClosed { .. })));
}

#[test]
fn given_dropped_receiver_when_resolving_then_reports_not_delivered() {
    let mut registry = CorrelationRegistry::new();
    let id = request_id('e');
    let receiver = registry
        .register(id.clone(), event("SAVE"), 1)
        .expect("registers");
    drop(receiver);

    let delivered = registry.take(&id).expect("registered").resolve(ok_envelope());

    assert!(!delivered);
}

/// **VALUE**: Verifies that closing one connection only abandons its own requests.
///
/// **WHY THIS MATTERS**: When `connect` replaces a connection, the old task drains
/// its requests while new requests are already in flight on the new connection.
///
/// **BUG THIS CATCHES**: Would catch if draining ignores the generation.
#[test]
fn given_requests_on_two_generations_when_draining_one_then_other_survives() {
    // GIVEN: Requests on generations 1 and 2
    let mut registry = CorrelationRegistry::new();
    let _old = registry
        .register(request_id('f'), event("OLD"), 1)
        .expect("registers");
    let _new = registry
        .register(request_id('g'), event("NEW"), 2)
        .expect("registers");

    // WHEN: Draining generation 1
    let drained = registry.drain_generation(1);

    // THEN: Only the old request is removed
    assert_eq!(drained.len(), 1);
    assert_eq!(drained[0].0, request_id('f'));
    assert!(registry.contains(&request_id('g')));
    assert_eq!(registry.len(), 1);
}
