use crate::error::codec::CodecError;
use crate::error::correlation::CorrelationError;

use common::ErrorLocation;
use models::{EventName, ModelError, ResponseEnvelope};

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum ClientError {
    #[error("Not Connected Error: {message} {location}")]
    NotConnected {
        message: String,
        location: ErrorLocation,
    },

    #[error("Transport Error: {message} {location}")]
    Transport {
        message: String,
        location: ErrorLocation,
    },

    #[error("Connection Closed Error: {message} {location}")]
    ConnectionClosed {
        message: String,
        location: ErrorLocation,
    },

    #[error("Request Rejected Error: {event} returned status {} {location}", .envelope.status)]
    Rejected {
        event: EventName,
        envelope: ResponseEnvelope,
        location: ErrorLocation,
    },

    #[error("Request Timeout Error: {message} {location}")]
    Timeout {
        message: String,
        location: ErrorLocation,
    },

    #[error("Runtime Error: {message} {location}")]
    Runtime {
        message: String,
        location: ErrorLocation,
    },

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Correlation(#[from] CorrelationError),
}

impl ClientError {
    #[track_caller]
    pub(crate) fn not_connected(message: impl Into<String>) -> Self {
        ClientError::NotConnected {
            message: message.into(),
            location: ErrorLocation::caller(),
        }
    }

    #[track_caller]
    pub(crate) fn transport(message: impl Into<String>) -> Self {
        ClientError::Transport {
            message: message.into(),
            location: ErrorLocation::caller(),
        }
    }

    #[track_caller]
    pub(crate) fn connection_closed(message: impl Into<String>) -> Self {
        ClientError::ConnectionClosed {
            message: message.into(),
            location: ErrorLocation::caller(),
        }
    }

    /// The server's envelope when the request was answered with a non-200 status.
    pub fn rejected_envelope(&self) -> Option<&ResponseEnvelope> {
        match self {
            ClientError::Rejected { envelope, .. } => Some(envelope),
            _ => None,
        }
    }
}
