//! End-to-end tests for the socket probe against a local WebSocket server.

mod probe;
