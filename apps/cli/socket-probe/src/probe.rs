//! One probe run: connect, log, optionally request, close.

use crate::cli::Cli;
use crate::error::ProbeError;

use common::ErrorLocation;
use socket_core::{
    ClientConfig, CloseKind, OutboundPayload, ResponseEnvelope, SocketClient,
};

use log::{error, info, warn};
use serde_json::Value;

/// Resolve settings: file, then environment, then command line.
pub fn load_config(cli: &Cli) -> Result<ClientConfig, ProbeError> {
    let config_dir = cli.config_dir()?;
    let mut config = ClientConfig::load(&config_dir)?;
    config.apply_env_overrides()?;
    cli.apply_to(&mut config);
    config.validate()?;

    Ok(config)
}

/// Build a client that logs its lifecycle and every broadcast of `events`.
pub fn build_client(config: &ClientConfig, events: &[String]) -> Result<SocketClient, ProbeError> {
    let client = match config.request_timeout() {
        Some(timeout) => SocketClient::with_request_timeout(timeout),
        None => SocketClient::new(),
    };

    client.on_open(|address| info!("Connected to {address}"));
    client.on_close(|event| match event.kind {
        CloseKind::Unexpected => warn!("Connection lost: {}", event.reason),
        _ => info!(
            "Connection closed ({:?}, code {:?}) {}",
            event.kind, event.code, event.reason
        ),
    });
    client.on_error(|e| error!("{e}"));

    for event in events {
        let name = event.clone();
        client.add_event_handler(event, move |envelope| {
            info!("{name} [{}] {}", envelope.status, envelope.payload);
        })?;
        info!("Subscribed to {event}");
    }

    Ok(client)
}

/// Parse the `--payload` argument.
#[track_caller]
pub fn parse_payload(raw: Option<&str>) -> Result<OutboundPayload, ProbeError> {
    match raw {
        None => Ok(OutboundPayload::Empty),
        Some(raw) => serde_json::from_str::<Value>(raw)
            .map(OutboundPayload::Json)
            .map_err(|e| ProbeError::Payload {
                message: format!("--payload is not valid JSON: {e}"),
                location: ErrorLocation::caller(),
            }),
    }
}

/// Send one request on an open client and wait for its response.
pub async fn request(
    client: &SocketClient,
    event: &str,
    payload: OutboundPayload,
) -> Result<ResponseEnvelope, ProbeError> {
    let pending = client.send(event, payload)?;
    info!("Sent {event} as request {}", pending.request_id());

    Ok(pending.await?)
}

/// Run the probe until the request completes or Ctrl-C is pressed.
pub async fn run(cli: &Cli) -> Result<(), ProbeError> {
    let config = load_config(cli)?;
    let payload = parse_payload(cli.payload.as_deref())?;
    let client = build_client(&config, &cli.subscribe)?;

    client.connect(config.connect_options()?)?;

    let outcome = tokio::select! {
        outcome = probe(&client, cli.request.as_deref(), payload) => outcome,
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted");
            Ok(())
        }
    };

    if let Err(e) = client.close() {
        info!("Nothing to close: {e}");
    }

    outcome
}

async fn probe(
    client: &SocketClient,
    request_event: Option<&str>,
    payload: OutboundPayload,
) -> Result<(), ProbeError> {
    client.wait_until_open().await?;

    let Some(event) = request_event else {
        info!("Watching events, press Ctrl-C to stop");
        return std::future::pending().await;
    };

    let envelope = request(client, event, payload).await?;
    let rendered = serde_json::to_string_pretty(&envelope).map_err(|e| ProbeError::Probe {
        message: format!("Failed to render response: {e}"),
        location: ErrorLocation::caller(),
    })?;
    println!("{rendered}");

    Ok(())
}
