//! Text framing for the socket protocol.
//!
//! Outbound frames carry one message:
//!
//! ```text
//! EVENT:REQUEST_ID[:PAYLOAD]
//! ```
//!
//! Inbound frames carry one or more newline-separated messages:
//!
//! ```text
//! EVENT[:REQUEST_ID][:STATUS][:PAYLOAD]
//! ```
//!
//! Payloads are JSON. A missing status means 200 and a missing payload means
//! `null`.
//!
//! The status slot comes before the payload, so a payload that is a bare
//! three-digit integer does not survive the trip: `EVENT:REQUEST_ID:404`
//! decodes as status 404 with a `null` payload. Wrap such numbers in an array
//! or object. Every other JSON payload decodes back unchanged.

mod decoder;
mod encoder;
mod outbound;
mod request_id;

pub use decoder::{decode_frame, decode_lines, parse_line};
pub use encoder::{encode, frame};
pub use outbound::OutboundPayload;
pub use request_id::generate_request_id;

/// Separates the fields of one message.
pub const FIELD_SEPARATOR: char = ':';

/// Separates messages within one inbound frame.
pub const LINE_SEPARATOR: char = '\n';
