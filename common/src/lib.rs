//! Shared building blocks for the socket workspace.
//!
//! Nothing in here knows about the wire protocol. These are the pieces every
//! other crate leans on:
//!
//! - [`ErrorLocation`] - call-site capture for error variants
//! - [`StatusCode`] - server-assigned response status
//!
//! ## Architecture
//!
//! - **common** (this crate): utilities with no protocol knowledge
//! - **models**: pure data carried through the protocol
//! - **socket-core**: codec, registries, dispatch and connection lifecycle
//! - **socket-probe**: command-line consumer wiring it all together

pub mod error;
pub mod status_code;


pub use error::error_location::ErrorLocation;
pub use status_code::StatusCode;
