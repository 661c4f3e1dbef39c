//! Test helpers for socket client integration tests.
//!
//! This module provides a throwaway WebSocket server on an ephemeral port that
//! hands each accepted connection to the test, plus small wait utilities.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::{WebSocketStream, accept_async};

/// Upper bound for any single wait in these tests.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Short reconnect delay used by tests.
pub const TEST_RECONNECT_DELAY: Duration = Duration::from_millis(100);

pub struct TestServer {
    pub address: String,
    connections: mpsc::UnboundedReceiver<ServerConnection>,
    accepted: Arc<AtomicUsize>,
}

impl TestServer {
    /// Bind `127.0.0.1:0` and accept WebSocket connections in the background.
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test server");
        let port = listener.local_addr().expect("Bound address").port();

        let (tx, connections) = mpsc::unbounded_channel();
        let accepted = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&accepted);

        tokio::spawn(async move {
            while let Ok((stream, _addr)) = listener.accept().await {
                let Ok(ws) = accept_async(stream).await else {
                    continue;
                };
                counter.fetch_add(1, Ordering::SeqCst);
                if tx.send(ServerConnection { ws }).is_err() {
                    break;
                }
            }
        });

        Self {
            address: format!("ws://127.0.0.1:{port}/ws"),
            connections,
            accepted,
        }
    }

    /// Wait for the next client connection.
    pub async fn next_connection(&mut self) -> ServerConnection {
        tokio::time::timeout(TEST_TIMEOUT, self.connections.recv())
            .await
            .expect("Timed out waiting for a client connection")
            .expect("Server accept loop stopped")
    }

    /// Number of WebSocket handshakes completed so far.
    pub fn accepted(&self) -> usize {
        self.accepted.load(Ordering::SeqCst)
    }
}

pub struct ServerConnection {
    ws: WebSocketStream<TcpStream>,
}

impl ServerConnection {
    pub async fn send_text(&mut self, text: &str) {
        self.ws
            .send(Message::Text(text.to_string().into()))
            .await
            .expect("Failed to send text frame");
    }

    pub async fn send_binary(&mut self, data: &[u8]) {
        self.ws
            .send(Message::Binary(data.to_vec().into()))
            .await
            .expect("Failed to send binary frame");
    }

    /// Next text frame from the client, skipping control frames.
    pub async fn recv_text(&mut self) -> String {
        tokio::time::timeout(TEST_TIMEOUT, async {
            loop {
                let message = self
                    .ws
                    .next()
                    .await
                    .expect("Client disconnected")
                    .expect("Error receiving frame");
                if let Message::Text(text) = message {
                    return text.as_str().to_owned();
                }
            }
        })
        .await
        .expect("Timed out waiting for a client frame")
    }

    /// Read a request frame and split it into event, request id and payload.
    pub async fn recv_request(&mut self) -> (String, String, Option<String>) {
        let text = self.recv_text().await;
        let mut fields = text.splitn(3, ':');
        let event = fields.next().expect("event field").to_owned();
        let request_id = fields.next().expect("request id field").to_owned();
        let payload = fields.next().map(str::to_owned);
        (event, request_id, payload)
    }

    /// Perform a close handshake initiated by the server.
    pub async fn close_cleanly(mut self) {
        let frame = CloseFrame {
            code: CloseCode::Away,
            reason: String::from("server shutting down").into(),
        };
        let _ = self.ws.send(Message::Close(Some(frame))).await;
        let _ = tokio::time::timeout(TEST_TIMEOUT, async {
            while let Some(Ok(_)) = self.ws.next().await {}
        })
        .await;
    }

    /// Wait until the client closes the connection.
    pub async fn wait_for_client_close(mut self) -> Option<CloseFrame> {
        tokio::time::timeout(TEST_TIMEOUT, async {
            while let Some(message) = self.ws.next().await {
                match message {
                    Ok(Message::Close(frame)) => return frame,
                    Ok(_) => continue,
                    Err(_) => return None,
                }
            }
            None
        })
        .await
        .expect("Timed out waiting for the client to close")
    }

    /// Drop the TCP stream without a close handshake.
    pub fn drop_abruptly(self) {
        drop(self.ws);
    }
}

/// Receive from a test channel or fail after [`TEST_TIMEOUT`].
pub async fn recv_within<T>(receiver: &mut mpsc::UnboundedReceiver<T>) -> T {
    tokio::time::timeout(TEST_TIMEOUT, receiver.recv())
        .await
        .expect("Timed out waiting for a callback")
        .expect("Callback channel closed")
}

/// Options for `address` with the short test reconnect delay.
pub fn test_options(address: &str, reconnect: bool) -> socket_core::ConnectOptions {
    socket_core::ConnectOptions::builder()
        .with_address(address)
        .with_reconnect(reconnect)
        .with_reconnect_delay(TEST_RECONNECT_DELAY)
        .build()
        .expect("Valid test options")
}

/// Connect `client` to `server` and wait until both sides see the connection.
pub async fn connect(
    client: &socket_core::SocketClient,
    server: &mut TestServer,
    reconnect: bool,
) -> ServerConnection {
    client
        .connect(test_options(&server.address, reconnect))
        .expect("Failed to start connection");
    let connection = server.next_connection().await;
    tokio::time::timeout(TEST_TIMEOUT, client.wait_until_open())
        .await
        .expect("Timed out waiting for open")
        .expect("Connection failed to open");
    connection
}
