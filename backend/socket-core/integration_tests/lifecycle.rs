use crate::helpers::{
    TEST_RECONNECT_DELAY, TEST_TIMEOUT, TestServer, connect, recv_within, test_options,
};

use socket_core::{ClientError, CloseKind, ConnectionState, SocketClient};

use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;

// ============================================================================
// Open and close
// ============================================================================

#[tokio::test]
async fn given_listening_server_when_connecting_then_open_hook_fires() {
    // GIVEN: A client with an open hook
    let mut server = TestServer::start().await;
    let client = SocketClient::new();
    let (tx, mut rx) = mpsc::unbounded_channel();
    client.on_open(move |address| {
        let _ = tx.send(address.to_string());
    });

    // WHEN: Connecting
    let _connection = connect(&client, &mut server, false).await;

    // THEN: Hook saw the address, state is open
    assert_eq!(recv_within(&mut rx).await, server.address);
    assert_eq!(client.state(), ConnectionState::Open);
}

/// **VALUE**: Verifies `close()` performs a close handshake and never reconnects.
///
/// **WHY THIS MATTERS**: Logging out or switching servers calls `close()`. A
/// reconnect afterwards would reopen a session the user just ended.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - An intentional close is classified as unexpected
/// - No close frame is sent
/// - The connection task keeps reconnecting after `close()`
#[tokio::test]
async fn given_open_connection_when_client_closes_then_no_reconnect() {
    // GIVEN: A connected client with reconnect enabled
    let mut server = TestServer::start().await;
    let client = SocketClient::new();
    let (tx, mut rx) = mpsc::unbounded_channel();
    client.on_close(move |event| {
        let _ = tx.send(event.clone());
    });
    let connection = connect(&client, &mut server, true).await;

    // WHEN: Closing
    client.close().expect("Close should succeed");

    // THEN: Server sees a normal close frame
    let frame = connection
        .wait_for_client_close()
        .await
        .expect("Client sends a close frame");
    assert_eq!(frame.code, CloseCode::Normal);

    // THEN: Close hook reports an intentional close
    let event = recv_within(&mut rx).await;
    assert_eq!(event.kind, CloseKind::Intentional);
    assert!(event.was_clean());

    // THEN: No reconnect happens
    tokio::time::sleep(TEST_RECONNECT_DELAY * 5).await;
    assert_eq!(server.accepted(), 1);
    assert_eq!(client.state(), ConnectionState::Closed);
}

/// **VALUE**: Verifies a server-initiated clean close does not trigger reconnect.
///
/// **WHY THIS MATTERS**: Servers close cleanly on shutdown or when they reject the
/// session. Reconnecting in a loop would hammer a server that asked us to leave.
///
/// **BUG THIS CATCHES**: Would catch if every closure is treated as unexpected.
#[tokio::test]
async fn given_open_connection_when_server_closes_cleanly_then_no_reconnect() {
    // GIVEN: A connected client with reconnect enabled
    let mut server = TestServer::start().await;
    let client = SocketClient::new();
    let (tx, mut rx) = mpsc::unbounded_channel();
    client.on_close(move |event| {
        let _ = tx.send(event.clone());
    });
    let connection = connect(&client, &mut server, true).await;

    // WHEN: The server closes with "going away"
    connection.close_cleanly().await;

    // THEN: Clean close with the server's code and reason
    let event = recv_within(&mut rx).await;
    assert_eq!(event.kind, CloseKind::Clean);
    assert_eq!(event.code, Some(1001));
    assert_eq!(event.reason, "server shutting down");

    // THEN: The client gives up
    tokio::time::sleep(TEST_RECONNECT_DELAY * 5).await;
    assert_eq!(server.accepted(), 1);
    assert_eq!(client.state(), ConnectionState::Closed);
    assert!(client.wait_until_open().await.is_err());
}

/// **VALUE**: Verifies in-flight requests are rejected when their connection dies.
///
/// **WHY THIS MATTERS**: A request whose response can never arrive must not leave
/// its caller waiting forever with a spinner on screen.
///
/// **BUG THIS CATCHES**: Would catch if closing the transport leaves waiters in
/// the registry.
#[tokio::test]
async fn given_request_in_flight_when_connection_drops_then_request_rejects() {
    // GIVEN: A request the server never answers
    let mut server = TestServer::start().await;
    let client = SocketClient::new();
    let mut connection = connect(&client, &mut server, false).await;
    let pending = client.send("SLOW", ()).expect("Send should succeed");
    let _ = connection.recv_request().await;

    // WHEN: The connection drops
    connection.drop_abruptly();

    // THEN: The request rejects with ConnectionClosed
    let result = tokio::time::timeout(TEST_TIMEOUT, pending)
        .await
        .expect("Request should settle");
    assert!(matches!(result, Err(ClientError::ConnectionClosed { .. })));
    assert_eq!(client.pending_requests(), 0);
}

#[tokio::test]
async fn given_request_timeout_when_server_is_silent_then_request_times_out() {
    let mut server = TestServer::start().await;
    let client = SocketClient::with_request_timeout(Duration::from_millis(200));
    let mut connection = connect(&client, &mut server, false).await;

    let pending = client.send("SLOW", ()).expect("Send should succeed");
    let _ = connection.recv_request().await;
    let result = tokio::time::timeout(TEST_TIMEOUT, pending)
        .await
        .expect("Request should settle");

    assert!(matches!(result, Err(ClientError::Timeout { .. })));
    assert_eq!(client.pending_requests(), 0);
}

/// **VALUE**: Verifies a failed connection attempt reaches the error and close hooks.
///
/// **WHY THIS MATTERS**: The UI shows "server unreachable" from the error hook. A
/// silent failure leaves it stuck on "connecting".
///
/// **BUG THIS CATCHES**: Would catch if connect failures are swallowed or are not
/// followed by a close event.
#[tokio::test]
async fn given_nothing_listening_when_connecting_then_error_and_close_hooks_fire() {
    // GIVEN: A port with nothing listening
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("Bind");
    let port = listener.local_addr().expect("Bound address").port();
    drop(listener);

    let client = SocketClient::new();
    let (error_tx, mut error_rx) = mpsc::unbounded_channel();
    let (close_tx, mut close_rx) = mpsc::unbounded_channel();
    client.on_error(move |error| {
        let _ = error_tx.send(matches!(error, ClientError::Transport { .. }));
    });
    client.on_close(move |event| {
        let _ = close_tx.send(event.kind);
    });

    // WHEN: Connecting without reconnect
    client
        .connect(test_options(&format!("ws://127.0.0.1:{port}/ws"), false))
        .expect("Connection task starts");

    // THEN: Transport error, then an unexpected close, then closed for good
    assert!(recv_within(&mut error_rx).await);
    assert_eq!(recv_within(&mut close_rx).await, CloseKind::Unexpected);
    let opened = tokio::time::timeout(TEST_TIMEOUT, client.wait_until_open())
        .await
        .expect("Wait should finish");
    assert!(matches!(opened, Err(ClientError::NotConnected { .. })));
    assert_eq!(client.state(), ConnectionState::Closed);
}

/// **VALUE**: Verifies that `connect` while connected replaces the old connection.
///
/// **WHY THIS MATTERS**: Switching servers must not leave a second socket open
/// that keeps delivering the old server's events.
///
/// **BUG THIS CATCHES**: Would catch if the previous connection is leaked.
#[tokio::test]
async fn given_open_connection_when_connecting_again_then_old_connection_closes() {
    // GIVEN: A connected client
    let mut server = TestServer::start().await;
    let client = SocketClient::new();
    let first = connect(&client, &mut server, true).await;

    // WHEN: Connecting again
    let mut second = connect(&client, &mut server, true).await;

    // THEN: The first connection is closed by the client, the second works
    assert!(first.wait_for_client_close().await.is_some());
    let pending = client.send("PING", ()).expect("Send should succeed");
    let (_, request_id, _) = second.recv_request().await;
    second.send_text(&format!("PING:{request_id}:200")).await;
    let envelope = tokio::time::timeout(TEST_TIMEOUT, pending)
        .await
        .expect("Timed out waiting for response")
        .expect("Response should resolve");
    assert!(envelope.is_ok());
    assert_eq!(client.state(), ConnectionState::Open);
}

#[tokio::test]
async fn given_last_client_handle_dropped_when_connected_then_connection_closes() {
    let mut server = TestServer::start().await;
    let client = SocketClient::new();
    let connection = connect(&client, &mut server, true).await;

    drop(client);

    assert!(connection.wait_for_client_close().await.is_some());
    tokio::time::sleep(TEST_RECONNECT_DELAY * 5).await;
    assert_eq!(server.accepted(), 1);
}

#[tokio::test]
async fn given_second_hook_when_registering_then_replaces_first() {
    let mut server = TestServer::start().await;
    let client = SocketClient::new();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let first_tx = tx.clone();
    client.on_open(move |_| {
        let _ = first_tx.send("first");
    });
    client.on_open(move |_| {
        let _ = tx.send("second");
    });

    let _connection = connect(&client, &mut server, false).await;

    assert_eq!(recv_within(&mut rx).await, "second");
    assert!(rx.try_recv().is_err());
}
