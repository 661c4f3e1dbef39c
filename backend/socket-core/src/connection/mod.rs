//! Connection lifecycle: connect, reconnect, send, close.
//!
//! # Architecture
//!
//! [`SocketClient`] is a cloneable handle. Each `connect` spawns a connection
//! task that owns the WebSocket and serves outbound frames from an mpsc
//! channel. The task reconnects on unexpected closure until `close` is called,
//! `connect` replaces it, or every client handle is dropped.
//!
//! Each task carries a generation number. Only the current generation updates
//! the published state, and closing a connection rejects only the requests
//! written to it.

pub(crate) mod client;
mod hooks;
mod pending;
mod reconnect;
pub(crate) mod task;

pub use client::SocketClient;
pub use hooks::{CloseHook, ErrorHook, MessageHook, OpenHook};
pub use pending::PendingResponse;
pub use reconnect::ReconnectSchedule;
