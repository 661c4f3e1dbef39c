//! Description of how a connection ended.

use serde::Serialize;

/// Why a connection closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CloseKind {
    /// `close()` was called on the client.
    Intentional,
    /// The server completed a close handshake.
    Clean,
    /// Reset, EOF without a close handshake, transport error, or a failed
    /// connection attempt.
    Unexpected,
}

/// Delivered to the close hook once per closed connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CloseEvent {
    pub code: Option<u16>,
    pub reason: String,
    pub kind: CloseKind,
}

impl CloseEvent {
    pub fn intentional(code: u16, reason: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            reason: reason.into(),
            kind: CloseKind::Intentional,
        }
    }

    pub fn clean(code: Option<u16>, reason: impl Into<String>) -> Self {
        Self {
            code,
            reason: reason.into(),
            kind: CloseKind::Clean,
        }
    }

    pub fn unexpected(reason: impl Into<String>) -> Self {
        Self {
            code: None,
            reason: reason.into(),
            kind: CloseKind::Unexpected,
        }
    }

    /// A close handshake completed (either side initiated it).
    pub fn was_clean(&self) -> bool {
        !matches!(self.kind, CloseKind::Unexpected)
    }

    /// Only unexpected closures are eligible for reconnection.
    pub fn warrants_reconnect(&self) -> bool {
        matches!(self.kind, CloseKind::Unexpected)
    }
}
