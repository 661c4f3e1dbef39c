use crate::error::codec::CodecError;

use common::ErrorLocation;

use serde::Serialize;
use serde_json::Value;

/// Payload of an outbound request.
///
/// `Json` values are serialized compactly. `Raw` text is written as-is, which
/// lets callers forward a payload that is already encoded.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum OutboundPayload {
    /// No payload field at all.
    #[default]
    Empty,
    Json(Value),
    Raw(String),
}

impl OutboundPayload {
    /// Serialize any value into a JSON payload.
    #[track_caller]
    pub fn json<T: Serialize>(value: &T) -> Result<Self, CodecError> {
        serde_json::to_value(value)
            .map(OutboundPayload::Json)
            .map_err(|e| CodecError::Serialize {
                message: e.to_string(),
                location: ErrorLocation::caller(),
            })
    }

    /// The payload field as written on the wire, or `None` when it is omitted.
    ///
    /// JSON `null` and empty raw text are omitted like `Empty`. Raw text may
    /// not contain a line break because the receiver splits frames on them.
    #[track_caller]
    pub fn to_wire(&self) -> Result<Option<String>, CodecError> {
        match self {
            OutboundPayload::Empty | OutboundPayload::Json(Value::Null) => Ok(None),
            OutboundPayload::Json(value) => serde_json::to_string(value)
                .map(Some)
                .map_err(|e| CodecError::Serialize {
                    message: e.to_string(),
                    location: ErrorLocation::caller(),
                }),
            OutboundPayload::Raw(text) if text.is_empty() => Ok(None),
            OutboundPayload::Raw(text) if text.contains(['\n', '\r']) => {
                Err(CodecError::Serialize {
                    message: String::from("Raw payload cannot contain a line break"),
                    location: ErrorLocation::caller(),
                })
            }
            OutboundPayload::Raw(text) => Ok(Some(text.clone())),
        }
    }
}

impl From<Value> for OutboundPayload {
    fn from(value: Value) -> Self {
        OutboundPayload::Json(value)
    }
}

impl From<()> for OutboundPayload {
    fn from(_: ()) -> Self {
        OutboundPayload::Empty
    }
}

impl From<&str> for OutboundPayload {
    fn from(text: &str) -> Self {
        OutboundPayload::Raw(text.to_owned())
    }
}

impl From<String> for OutboundPayload {
    fn from(text: String) -> Self {
        OutboundPayload::Raw(text)
    }
}

impl<T: Into<OutboundPayload>> From<Option<T>> for OutboundPayload {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_default()
    }
}
