use crate::helpers::{
    TEST_RECONNECT_DELAY, TEST_TIMEOUT, TestServer, connect, recv_within,
};

use socket_core::{ClientError, CloseKind, ConnectOptions, ConnectionState, SocketClient};

use std::time::{Duration, Instant};

use serde_json::json;
use tokio::sync::mpsc;

// ============================================================================
// Reconnection after unexpected closure
// ============================================================================

/// **VALUE**: Verifies an unexpected drop is followed by a reconnect after the delay.
///
/// **WHY THIS MATTERS**: Wi-Fi drops and server restarts are routine. Without
/// automatic reconnection the UI silently stops receiving live updates.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - Unexpected closure is not classified as such
/// - The reconnect fires without waiting for the delay
/// - The open hook does not fire again on the new connection
#[tokio::test]
async fn given_reconnect_enabled_when_connection_drops_then_reconnects_after_delay() {
    // GIVEN: A connected client with open and close hooks
    let mut server = TestServer::start().await;
    let client = SocketClient::new();
    let (open_tx, mut open_rx) = mpsc::unbounded_channel();
    let (close_tx, mut close_rx) = mpsc::unbounded_channel();
    client.on_open(move |_| {
        let _ = open_tx.send(Instant::now());
    });
    client.on_close(move |event| {
        let _ = close_tx.send((event.kind, Instant::now()));
    });
    let connection = connect(&client, &mut server, true).await;
    recv_within(&mut open_rx).await;

    // WHEN: The server drops the connection without a handshake
    connection.drop_abruptly();

    // THEN: Unexpected close, then a new connection after the delay
    let (kind, closed_at) = recv_within(&mut close_rx).await;
    assert_eq!(kind, CloseKind::Unexpected);

    let _second = server.next_connection().await;
    let reopened_at = recv_within(&mut open_rx).await;
    assert!(reopened_at.duration_since(closed_at) >= TEST_RECONNECT_DELAY);
    assert_eq!(server.accepted(), 2);

    tokio::time::timeout(TEST_TIMEOUT, client.wait_until_open())
        .await
        .expect("Timed out waiting for open")
        .expect("Reconnected");
    assert_eq!(client.state(), ConnectionState::Open);
}

/// **VALUE**: Verifies subscriptions carry over to the reconnected transport.
///
/// **WHY THIS MATTERS**: UI stores subscribe once at startup. Losing their handlers
/// on reconnect would freeze every live view after the first network blip.
///
/// **BUG THIS CATCHES**: Would catch if reconnect builds a fresh subscription table.
#[tokio::test]
async fn given_subscription_when_reconnected_then_still_receives_broadcasts() {
    // GIVEN: A handler and a dropped connection
    let mut server = TestServer::start().await;
    let client = SocketClient::new();
    let (tx, mut rx) = mpsc::unbounded_channel();
    client
        .add_event_handler("FILESERVER_STATISTICS", move |envelope| {
            let _ = tx.send(envelope.payload.clone());
        })
        .expect("Valid event");
    let connection = connect(&client, &mut server, true).await;
    connection.drop_abruptly();

    // WHEN: The client reconnects and the server broadcasts
    let mut second = server.next_connection().await;
    tokio::time::timeout(TEST_TIMEOUT, client.wait_until_open())
        .await
        .expect("Timed out waiting for open")
        .expect("Reconnected");
    second
        .send_text(r#"FILESERVER_STATISTICS:{"files":7}"#)
        .await;

    // THEN: The original handler receives it
    assert_eq!(recv_within(&mut rx).await, json!({ "files": 7 }));
}

#[tokio::test]
async fn given_reconnect_disabled_when_connection_drops_then_stays_closed() {
    let mut server = TestServer::start().await;
    let client = SocketClient::new();
    let (tx, mut rx) = mpsc::unbounded_channel();
    client.on_close(move |event| {
        let _ = tx.send(event.kind);
    });
    let connection = connect(&client, &mut server, false).await;

    connection.drop_abruptly();

    assert_eq!(recv_within(&mut rx).await, CloseKind::Unexpected);
    tokio::time::sleep(TEST_RECONNECT_DELAY * 5).await;
    assert_eq!(server.accepted(), 1);
    assert_eq!(client.state(), ConnectionState::Closed);
}

/// **VALUE**: Verifies `close()` during the reconnect wait cancels the reconnect.
///
/// **WHY THIS MATTERS**: A user who logs out while the client is between attempts
/// must not be reconnected a second later.
///
/// **BUG THIS CATCHES**: Would catch if the reconnect timer ignores `close()`.
#[tokio::test]
async fn given_pending_reconnect_when_closing_then_no_attempt_is_made() {
    // GIVEN: A client with a long reconnect delay, just dropped by the server
    let mut server = TestServer::start().await;
    let client = SocketClient::new();
    let (tx, mut rx) = mpsc::unbounded_channel();
    client.on_close(move |event| {
        let _ = tx.send(event.kind);
    });
    let options = ConnectOptions::builder()
        .with_address(server.address.as_str())
        .with_reconnect_delay(Duration::from_millis(600))
        .build()
        .expect("Valid options");
    client.connect(options).expect("Connection task starts");
    let connection = server.next_connection().await;
    tokio::time::timeout(TEST_TIMEOUT, client.wait_until_open())
        .await
        .expect("Timed out waiting for open")
        .expect("Opened");
    connection.drop_abruptly();
    assert_eq!(recv_within(&mut rx).await, CloseKind::Unexpected);

    // WHEN: Closing while the reconnect timer runs
    client.close().expect("Close should succeed");

    // THEN: No second connection after the delay has passed
    tokio::time::sleep(Duration::from_millis(1_200)).await;
    assert_eq!(server.accepted(), 1);
    assert_eq!(client.state(), ConnectionState::Closed);
}

#[tokio::test]
async fn given_connection_waiting_to_reconnect_when_sending_then_fails_fast() {
    let mut server = TestServer::start().await;
    let client = SocketClient::new();
    let (tx, mut rx) = mpsc::unbounded_channel();
    client.on_close(move |_| {
        let _ = tx.send(());
    });
    let options = ConnectOptions::builder()
        .with_address(server.address.as_str())
        .with_reconnect_delay(Duration::from_millis(600))
        .build()
        .expect("Valid options");
    client.connect(options).expect("Connection task starts");
    let connection = server.next_connection().await;
    tokio::time::timeout(TEST_TIMEOUT, client.wait_until_open())
        .await
        .expect("Timed out waiting for open")
        .expect("Opened");

    connection.drop_abruptly();
    recv_within(&mut rx).await;
    let result = client.send("LOG__GET", ());

    assert!(matches!(result, Err(ClientError::NotConnected { .. })));
    client.close().expect("Close should succeed");
}
