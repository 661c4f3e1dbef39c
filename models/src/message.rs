//! Decoded messages and the envelope delivered to handlers.

use crate::{EventName, RequestId, StatusCode};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// One logical message, decoded from one line of an inbound frame.
///
/// A message is a *response* when its request id matches an outstanding
/// request; otherwise it is a broadcast and goes to subscriptions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    pub event: EventName,
    pub request_id: Option<RequestId>,
    pub status: StatusCode,
    pub payload: Value,
}

impl Message {
    /// A broadcast with status 200.
    pub fn broadcast(event: EventName, payload: Value) -> Self {
        Self {
            event,
            request_id: None,
            status: StatusCode::OK,
            payload,
        }
    }

    pub fn envelope(&self) -> ResponseEnvelope {
        ResponseEnvelope {
            status: self.status,
            payload: self.payload.clone(),
        }
    }

    pub fn into_envelope(self) -> ResponseEnvelope {
        ResponseEnvelope {
            status: self.status,
            payload: self.payload,
        }
    }
}

/// What a handler or a request's caller receives: status plus payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseEnvelope {
    pub status: StatusCode,
    pub payload: Value,
}

impl ResponseEnvelope {
    pub fn is_ok(&self) -> bool {
        self.status.is_ok()
    }

    /// Deserialize the payload into a concrete type.
    pub fn payload_as<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.payload)
    }
}
