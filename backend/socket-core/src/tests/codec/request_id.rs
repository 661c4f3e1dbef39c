use crate::codec::generate_request_id;

use models::RequestId;

use std::collections::HashSet;

/// **VALUE**: Verifies generated ids satisfy the wire format.
///
/// **WHY THIS MATTERS**: The server and the inbound parser only recognise
/// exactly 15 alphanumeric characters. Any other shape makes every response look
/// like a broadcast and leaves callers waiting forever.
///
/// **BUG THIS CATCHES**: Would catch if truncation or padding is lost.
#[test]
fn given_generator_when_generating_then_id_is_fifteen_alphanumerics() {
    // WHEN: Generating ids
    for _ in 0..100 {
        let id = generate_request_id().expect("generated id is valid");

        // THEN: Fixed length, alphanumeric
        assert_eq!(id.as_str().len(), RequestId::LEN);
        assert!(RequestId::is_valid(id.as_str()));
    }
}

#[test]
fn given_many_ids_when_generating_then_collisions_are_rare() {
    let ids: HashSet<String> = (0..1_000)
        .map(|_| {
            generate_request_id()
                .expect("generated id is valid")
                .to_string()
        })
        .collect();

    assert!(ids.len() > 990, "expected nearly unique ids, got {}", ids.len());
}

#[test]
fn given_generator_when_generating_then_id_is_lowercase_base36() {
    let id = generate_request_id().expect("generated id is valid");

    assert!(
        id.as_str()
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase())
    );
}
