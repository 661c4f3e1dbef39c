use crate::helpers::{TEST_TIMEOUT, TestServer, connect, recv_within};

use socket_core::{ClientError, ResponseEnvelope, SocketClient, StatusCode};

use serde_json::json;
use tokio::sync::mpsc;

// ============================================================================
// Request / response correlation against a live WebSocket server
// ============================================================================

/// **VALUE**: Verifies a request travels as `EVENT:ID:PAYLOAD` and settles with the
/// matching response.
///
/// **WHY THIS MATTERS**: This is the main client operation. Every UI action that
/// needs data from the server goes through it.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - The frame layout changes
/// - The response is not correlated by request id
/// - The payload is not decoded from JSON
#[tokio::test]
async fn given_open_connection_when_server_answers_request_then_future_resolves() {
    // GIVEN: A connected client
    let mut server = TestServer::start().await;
    let client = SocketClient::new();
    let mut connection = connect(&client, &mut server, false).await;

    // WHEN: Sending a request and answering it
    let pending = client
        .send("LOG__GET", json!({ "page": 1 }))
        .expect("Send should succeed");
    let (event, request_id, payload) = connection.recv_request().await;
    connection
        .send_text(&format!(r#"LOG__GET:{request_id}:200:{{"count":2}}"#))
        .await;

    // THEN: Frame layout matches and the future resolves with the payload
    assert_eq!(event, "LOG__GET");
    assert_eq!(request_id, pending.request_id().as_str());
    assert_eq!(payload.as_deref(), Some(r#"{"page":1}"#));

    let envelope = tokio::time::timeout(TEST_TIMEOUT, pending)
        .await
        .expect("Timed out waiting for response")
        .expect("Response should resolve");
    assert_eq!(envelope.status, StatusCode::OK);
    assert_eq!(envelope.payload, json!({ "count": 2 }));
    assert_eq!(client.pending_requests(), 0);
}

/// **VALUE**: Verifies a non-200 response rejects with the server's envelope.
///
/// **WHY THIS MATTERS**: Callers show the server's error payload to the user; losing
/// it leaves only a generic failure.
///
/// **BUG THIS CATCHES**: Would catch if non-200 responses resolve, or reject without
/// the envelope.
#[tokio::test]
async fn given_open_connection_when_server_returns_404_then_future_rejects_with_envelope() {
    // GIVEN: A connected client with a request in flight
    let mut server = TestServer::start().await;
    let client = SocketClient::new();
    let mut connection = connect(&client, &mut server, false).await;
    let pending = client.send("MISSING", ()).expect("Send should succeed");
    let (_, request_id, payload) = connection.recv_request().await;
    assert_eq!(payload, None);

    // WHEN: The server answers 404
    connection
        .send_text(&format!(r#"MISSING:{request_id}:404:"unknown event""#))
        .await;

    // THEN: Rejected with status and payload
    let error = tokio::time::timeout(TEST_TIMEOUT, pending)
        .await
        .expect("Timed out waiting for response")
        .expect_err("Response should reject");
    let envelope = error.rejected_envelope().expect("Rejection carries envelope");
    assert_eq!(envelope.status, StatusCode::NOT_FOUND);
    assert_eq!(envelope.payload, json!("unknown event"));
}

#[tokio::test]
async fn given_raw_string_payload_when_sending_then_server_receives_it_verbatim() {
    let mut server = TestServer::start().await;
    let client = SocketClient::new();
    let mut connection = connect(&client, &mut server, false).await;

    let _pending = client
        .send("SAVE", r#"{"name":"report.pdf"}"#)
        .expect("Send should succeed");
    let (_, _, payload) = connection.recv_request().await;

    assert_eq!(payload.as_deref(), Some(r#"{"name":"report.pdf"}"#));
}

#[tokio::test]
async fn given_serializable_payload_when_sending_json_then_server_receives_json() {
    #[derive(serde::Serialize)]
    struct Rename<'a> {
        from: &'a str,
        to: &'a str,
    }

    let mut server = TestServer::start().await;
    let client = SocketClient::new();
    let mut connection = connect(&client, &mut server, false).await;

    let _pending = client
        .send_json("RENAME", &Rename { from: "a.txt", to: "b.txt" })
        .expect("Send should succeed");
    let (event, _, payload) = connection.recv_request().await;

    assert_eq!(event, "RENAME");
    assert_eq!(payload.as_deref(), Some(r#"{"from":"a.txt","to":"b.txt"}"#));
}

// ============================================================================
// Broadcast delivery
// ============================================================================

/// **VALUE**: Verifies a batched frame reaches handlers line by line, in order.
///
/// **WHY THIS MATTERS**: The server batches broadcasts. Handlers keeping running
/// totals break if lines are lost or reordered.
///
/// **BUG THIS CATCHES**: Would catch if only the first line of a frame is handled,
/// or a malformed line aborts the rest.
#[tokio::test]
async fn given_batched_frame_when_received_then_handlers_run_in_line_order() {
    // GIVEN: Handlers on two events, reporting what they saw
    let mut server = TestServer::start().await;
    let client = SocketClient::new();
    let (tx, mut rx) = mpsc::unbounded_channel();
    for event in ["UPLOAD", "DELETE"] {
        let tx = tx.clone();
        client
            .add_event_handler(event, move |envelope: &ResponseEnvelope| {
                let _ = tx.send((event, envelope.payload.clone()));
            })
            .expect("Valid event");
    }
    let mut connection = connect(&client, &mut server, false).await;

    // WHEN: One frame carries three good lines and one bad line
    connection
        .send_text("UPLOAD:{\"id\":1}\nDELETE:{broken\nDELETE:{\"id\":2}\nUPLOAD:{\"id\":3}")
        .await;

    // THEN: The good lines arrive in order
    assert_eq!(recv_within(&mut rx).await, ("UPLOAD", json!({ "id": 1 })));
    assert_eq!(recv_within(&mut rx).await, ("DELETE", json!({ "id": 2 })));
    assert_eq!(recv_within(&mut rx).await, ("UPLOAD", json!({ "id": 3 })));
}

#[tokio::test]
async fn given_binary_frame_when_received_then_decoded_like_text() {
    let mut server = TestServer::start().await;
    let client = SocketClient::new();
    let (tx, mut rx) = mpsc::unbounded_channel();
    client
        .add_event_handler("STATS", move |envelope| {
            let _ = tx.send(envelope.payload.clone());
        })
        .expect("Valid event");
    let mut connection = connect(&client, &mut server, false).await;

    connection.send_binary(br#"STATS:{"files":42}"#).await;

    assert_eq!(recv_within(&mut rx).await, json!({ "files": 42 }));
}

/// **VALUE**: Verifies a duplicated response is delivered once to the request and
/// then as a broadcast.
///
/// **WHY THIS MATTERS**: Correlation is at-most-once. A second copy must never
/// settle a request twice.
///
/// **BUG THIS CATCHES**: Would catch if the waiter survives its first response.
#[tokio::test]
async fn given_duplicate_response_when_received_then_second_goes_to_handlers() {
    // GIVEN: A handler on the request's event and a request in flight
    let mut server = TestServer::start().await;
    let client = SocketClient::new();
    let (tx, mut rx) = mpsc::unbounded_channel();
    client
        .add_event_handler("LOG__GET", move |envelope| {
            let _ = tx.send(envelope.payload.clone());
        })
        .expect("Valid event");
    let mut connection = connect(&client, &mut server, false).await;
    let pending = client.send("LOG__GET", ()).expect("Send should succeed");
    let (_, request_id, _) = connection.recv_request().await;

    // WHEN: The server answers twice
    connection
        .send_text(&format!("LOG__GET:{request_id}:200:1\nLOG__GET:{request_id}:200:2"))
        .await;

    // THEN: Request gets the first, handler the second
    let envelope = tokio::time::timeout(TEST_TIMEOUT, pending)
        .await
        .expect("Timed out waiting for response")
        .expect("Response should resolve");
    assert_eq!(envelope.payload, json!(1));
    assert_eq!(recv_within(&mut rx).await, json!(2));
}

#[tokio::test]
async fn given_removed_handler_when_broadcast_arrives_then_it_is_not_called() {
    let mut server = TestServer::start().await;
    let client = SocketClient::new();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let removed_tx = tx.clone();
    let removed = client
        .add_event_handler("PING", move |_| {
            let _ = removed_tx.send("removed");
        })
        .expect("Valid event");
    client
        .add_event_handler("PING", move |_| {
            let _ = tx.send("kept");
        })
        .expect("Valid event");
    assert!(client.remove_event_handler(removed));
    let mut connection = connect(&client, &mut server, false).await;

    connection.send_text("PING").await;

    assert_eq!(recv_within(&mut rx).await, "kept");
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn given_message_hook_when_frame_arrives_then_hook_runs_after_handlers() {
    let mut server = TestServer::start().await;
    let client = SocketClient::new();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let handler_tx = tx.clone();
    client
        .add_event_handler("NEWS", move |_| {
            let _ = handler_tx.send(String::from("handler"));
        })
        .expect("Valid event");
    client.on_message(move |frame| {
        let _ = tx.send(String::from_utf8_lossy(frame).into_owned());
    });
    let mut connection = connect(&client, &mut server, false).await;

    connection.send_text("NEWS:\"hello\"").await;

    assert_eq!(recv_within(&mut rx).await, "handler");
    assert_eq!(recv_within(&mut rx).await, "NEWS:\"hello\"");
}

#[tokio::test]
async fn given_closed_connection_when_sending_then_fails_fast() {
    let mut server = TestServer::start().await;
    let client = SocketClient::new();
    let _connection = connect(&client, &mut server, false).await;

    client.close().expect("Close should succeed");
    let result = client.send("LOG__GET", ());

    assert!(matches!(result, Err(ClientError::NotConnected { .. })));
}
