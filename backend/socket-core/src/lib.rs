//! Client core for a line-framed WebSocket event protocol.
//!
//! Requests are correlated with responses by a generated request id;
//! server-initiated events fan out to subscribed handlers. The connection
//! reconnects after unexpected closure and keeps every subscription.

pub mod codec;
pub mod config;
pub mod connection;
pub mod dispatch;
pub mod error;
pub mod registry;

#[cfg(test)]
mod tests;

pub use codec::OutboundPayload;
pub use config::ClientConfig;
pub use connection::{PendingResponse, SocketClient};
pub use dispatch::{DispatchOutcome, Router};
pub use error::{ClientError, CodecError, ConfigError, CoreError, CorrelationError};
pub use registry::SubscriptionId;

pub use models::{
    CloseEvent, CloseKind, ConnectOptions, ConnectionState, EventName, Message, RequestId,
    ResponseEnvelope, StatusCode,
};
