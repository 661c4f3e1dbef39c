//! Data carried through the socket protocol.
//!
//! This crate contains pure data structures: validated wire tokens, decoded
//! messages, the envelope handed to handlers, and the options and events that
//! describe a connection's lifecycle. No I/O and no protocol logic live here.

pub mod connection;
pub mod error;
pub mod event_name;
pub mod message;
pub mod request_id;

#[cfg(test)]
mod tests;

pub use common::{ErrorLocation, StatusCode};
pub use connection::builder::ConnectOptionsBuilder;
pub use connection::close_event::{CloseEvent, CloseKind};
pub use connection::options::{ConnectOptions, ReconnectStrategy};
pub use connection::state::ConnectionState;
pub use error::model_error::ModelError;
pub use event_name::EventName;
pub use message::{Message, ResponseEnvelope};
pub use request_id::RequestId;
