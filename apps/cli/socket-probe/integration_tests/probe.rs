use socket_core::{ClientConfig, OutboundPayload, StatusCode};
use socket_probe::error::ProbeError;
use socket_probe::probe::{build_client, request};

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use tokio::net::TcpListener;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Serve one connection that answers each `EVENT:ID[:PAYLOAD]` request with
/// `EVENT:ID:STATUS:PAYLOAD`, echoing the payload back.
async fn start_echo_server(status: u16) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test server");
    let port = listener.local_addr().expect("Bound address").port();

    tokio::spawn(async move {
        let Ok((stream, _addr)) = listener.accept().await else {
            return;
        };
        let Ok(mut ws) = accept_async(stream).await else {
            return;
        };

        while let Some(Ok(message)) = ws.next().await {
            let Message::Text(text) = message else {
                continue;
            };
            let mut fields = text.as_str().splitn(3, ':');
            let event = fields.next().unwrap_or_default().to_owned();
            let request_id = fields.next().unwrap_or_default().to_owned();
            let payload = fields.next().unwrap_or("null").to_owned();

            let reply = format!("{event}:{request_id}:{status}:{payload}");
            if ws.send(Message::Text(reply.into())).await.is_err() {
                break;
            }
        }
    });

    format!("ws://127.0.0.1:{port}/ws")
}

fn probe_config(address: String) -> ClientConfig {
    ClientConfig {
        address,
        reconnect: false,
        request_timeout_ms: Some(2_000),
        ..ClientConfig::default()
    }
}

/// **VALUE**: Verifies the probe's request path end to end: config, client, request,
/// response.
///
/// **WHY THIS MATTERS**: This is what `socket-probe --request` does. If it breaks the
/// tool is useless for checking a server by hand.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - Config values do not reach the connection
/// - The payload flag is not sent as JSON
/// - The response envelope is not returned to the caller
#[tokio::test]
async fn given_echo_server_when_probing_request_then_returns_echoed_envelope() {
    // GIVEN: An echo server and a client built from config
    let address = start_echo_server(200).await;
    let config = probe_config(address);
    let client = build_client(&config, &[String::from("LOG__APPENDED")]).expect("build client");
    client
        .connect(config.connect_options().expect("connect options"))
        .expect("connect");
    tokio::time::timeout(TEST_TIMEOUT, client.wait_until_open())
        .await
        .expect("Timed out waiting for open")
        .expect("Connection failed to open");

    // WHEN: Sending a request with a JSON payload
    let payload = OutboundPayload::Json(json!({ "page": 2 }));
    let envelope = tokio::time::timeout(TEST_TIMEOUT, request(&client, "LOG__GET", payload))
        .await
        .expect("Timed out waiting for response")
        .expect("Request should succeed");

    // THEN: The echoed payload with status 200
    assert_eq!(envelope.status, StatusCode::OK);
    assert_eq!(envelope.payload, json!({ "page": 2 }));

    client.close().expect("close");
}

/// **VALUE**: Verifies a rejected request surfaces as a probe error with the status.
///
/// **WHY THIS MATTERS**: The probe exits non-zero on rejection; the message must show
/// what the server answered.
///
/// **BUG THIS CATCHES**: Would catch if non-200 responses are reported as success.
#[tokio::test]
async fn given_server_rejects_when_probing_request_then_returns_core_error() {
    // GIVEN: A server answering 500
    let address = start_echo_server(500).await;
    let config = probe_config(address);
    let client = build_client(&config, &[]).expect("build client");
    client
        .connect(config.connect_options().expect("connect options"))
        .expect("connect");
    tokio::time::timeout(TEST_TIMEOUT, client.wait_until_open())
        .await
        .expect("Timed out waiting for open")
        .expect("Connection failed to open");

    // WHEN: Sending a request without payload
    let result = tokio::time::timeout(
        TEST_TIMEOUT,
        request(&client, "SESSION__DELETE", OutboundPayload::Empty),
    )
    .await
    .expect("Timed out waiting for response");

    // THEN: Core error naming the status
    match result {
        Err(ProbeError::Core { message, .. }) => {
            assert!(message.contains("SESSION__DELETE"), "message: {message}");
            assert!(message.contains("500"), "message: {message}");
        }
        other => panic!("Expected Core error, got {other:?}"),
    }
}

#[tokio::test]
async fn given_client_not_connected_when_probing_request_then_fails_fast() {
    let client = build_client(&ClientConfig::default(), &[]).expect("build client");

    let result = request(&client, "LOG__GET", OutboundPayload::Empty).await;

    assert!(matches!(result, Err(ProbeError::Core { .. })));
}
