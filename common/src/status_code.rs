//! Status codes assigned by the server to response frames.
//!
//! The wire carries them as exactly three ASCII digits. A frame without a
//! status field is treated as [`StatusCode::OK`].

use serde::{Deserialize, Serialize};

/// Server-assigned status of a response frame.
///
/// Stored directly as the numeric value read off the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusCode(pub u16);

impl StatusCode {
    /// Status assumed when a frame omits the field.
    pub const OK: StatusCode = StatusCode(200);
    pub const BAD_REQUEST: StatusCode = StatusCode(400);
    pub const NOT_FOUND: StatusCode = StatusCode(404);
    pub const INTERNAL_SERVER_ERROR: StatusCode = StatusCode(500);

    /// True for exactly 200.
    ///
    /// Other 2xx codes are not treated as success: pending requests resolve
    /// only on 200 and are rejected on anything else.
    pub fn is_ok(&self) -> bool {
        self.0 == 200
    }

    /// 4xx client errors.
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.0)
    }

    /// 5xx server errors.
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.0)
    }

    /// Parse the three-digit wire form. Anything else is `None`.
    pub fn from_wire(field: &str) -> Option<Self> {
        if field.len() != 3 || !field.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        field.parse::<u16>().ok().map(StatusCode)
    }
}

impl Default for StatusCode {
    fn default() -> Self {
        StatusCode::OK
    }
}

impl From<u16> for StatusCode {
    fn from(code: u16) -> Self {
        StatusCode(code)
    }
}

impl std::fmt::Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
