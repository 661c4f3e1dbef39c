//! Types describing a connection's configuration and lifecycle.

pub mod builder;
pub mod close_event;
pub mod options;
pub mod state;
