//! The connection task: one per `connect` call, spanning every reconnect.

use super::client::ClientInner;
use super::reconnect::ReconnectSchedule;
use crate::error::client::ClientError;

use models::{CloseEvent, ConnectOptions, ConnectionState};

use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsWriter = SplitSink<WsStream, WsMessage>;
type WsReader = SplitStream<WsStream>;

/// Close code sent when the client closes on purpose.
pub(crate) const NORMAL_CLOSURE: u16 = 1000;
const CLOSE_REASON: &str = "client closed connection";

/// How long to wait for the server to answer our close frame.
const CLOSE_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(2);

/// Commands from client handles to the connection task.
#[derive(Debug)]
pub(crate) enum LinkCommand {
    /// Write one encoded frame.
    Send(String),
    /// Close the transport and stop reconnecting.
    Close,
}

pub(crate) async fn run(
    inner: Arc<ClientInner>,
    options: ConnectOptions,
    generation: u64,
    mut commands: mpsc::UnboundedReceiver<LinkCommand>,
) {
    let address = options.address.clone();
    let mut schedule = ReconnectSchedule::new(&options.strategy);

    loop {
        inner.set_state(generation, ConnectionState::Connecting);
        info!("Connecting to {address}");

        let connected = tokio::select! {
            result = connect_async(address.as_str()) => result,
            () = closed_by_caller(&mut commands) => {
                info!("Connection to {address} cancelled before it opened");
                inner.emit_close(&CloseEvent::intentional(NORMAL_CLOSURE, CLOSE_REASON));
                inner.finish(generation);
                return;
            }
        };

        let close_event = match connected {
            Ok((stream, _response)) => {
                inner.set_state(generation, ConnectionState::Open);
                schedule.reset();
                info!("Connected to {address}");
                inner.emit_open(&address);
                serve(&inner, stream, &mut commands).await
            }
            Err(e) => {
                let error = ClientError::transport(format!("Failed to connect to {address}: {e}"));
                error!("{error}");
                inner.emit_error(&error);
                CloseEvent::unexpected(e.to_string())
            }
        };

        inner.close_generation(generation, &close_event);
        info!(
            "Connection to {address} closed ({:?}, code {:?}): {}",
            close_event.kind, close_event.code, close_event.reason
        );
        inner.emit_close(&close_event);

        if !options.reconnect || !close_event.warrants_reconnect() || !inner.is_current(generation)
        {
            inner.finish(generation);
            return;
        }

        let delay = schedule.next_delay();
        info!("Reconnecting to {address} in {delay:?}");

        tokio::select! {
            () = tokio::time::sleep(delay) => {}
            () = closed_by_caller(&mut commands) => {
                info!("Reconnect to {address} cancelled");
                inner.finish(generation);
                return;
            }
        }
    }
}

/// Pump one open transport until it closes.
async fn serve(
    inner: &ClientInner,
    stream: WsStream,
    commands: &mut mpsc::UnboundedReceiver<LinkCommand>,
) -> CloseEvent {
    let (mut writer, mut reader) = stream.split();
    let mut server_close = None;

    loop {
        tokio::select! {
            inbound = reader.next() => match inbound {
                Some(Ok(WsMessage::Text(text))) => inner.handle_frame(text.as_bytes()),
                Some(Ok(WsMessage::Binary(data))) => inner.handle_frame(&data),
                Some(Ok(WsMessage::Close(frame))) => {
                    debug!("Server sent close frame: {frame:?}");
                    server_close = Some(match frame {
                        Some(frame) => {
                            CloseEvent::clean(Some(u16::from(frame.code)), frame.reason.as_str())
                        }
                        None => CloseEvent::clean(None, ""),
                    });
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    if let Some(event) = server_close.take() {
                        return event;
                    }
                    return transport_failure(inner, format!("Connection error: {e}"));
                }
                None => {
                    return server_close.unwrap_or_else(|| {
                        CloseEvent::unexpected("Connection ended without a close frame")
                    });
                }
            },
            command = commands.recv() => match command {
                Some(LinkCommand::Send(frame)) => {
                    if let Err(e) = writer.send(WsMessage::Text(frame.into())).await {
                        if let Some(event) = server_close.take() {
                            return event;
                        }
                        return transport_failure(inner, format!("Failed to write frame: {e}"));
                    }
                }
                Some(LinkCommand::Close) | None => return shutdown(writer, reader).await,
            },
        }
    }
}

fn transport_failure(inner: &ClientInner, message: String) -> CloseEvent {
    let error = ClientError::transport(message);
    error!("{error}");
    inner.emit_error(&error);
    CloseEvent::unexpected(error.to_string())
}

/// Send our close frame and give the server a moment to answer it.
async fn shutdown(mut writer: WsWriter, mut reader: WsReader) -> CloseEvent {
    let frame = CloseFrame {
        code: CloseCode::Normal,
        reason: String::from(CLOSE_REASON).into(),
    };

    if let Err(e) = writer.send(WsMessage::Close(Some(frame))).await {
        debug!("Failed to send close frame: {e}");
    }

    let drained = tokio::time::timeout(CLOSE_HANDSHAKE_TIMEOUT, async {
        while let Some(Ok(_)) = reader.next().await {}
    })
    .await;

    if drained.is_err() {
        debug!("Close handshake timed out after {CLOSE_HANDSHAKE_TIMEOUT:?}");
    }

    CloseEvent::intentional(NORMAL_CLOSURE, CLOSE_REASON)
}

/// Resolves once the caller closes this link or every sender is gone.
///
/// Frames still queued for a transport that has already closed are dropped;
/// their requests were rejected when it closed.
async fn closed_by_caller(commands: &mut mpsc::UnboundedReceiver<LinkCommand>) {
    while let Some(command) = commands.recv().await {
        match command {
            LinkCommand::Close => return,
            LinkCommand::Send(frame) => debug!("Discarding frame for closed connection: {frame}"),
        }
    }
}
