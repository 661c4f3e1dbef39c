use common::ErrorLocation;

use socket_core::{ClientError, ConfigError, CoreError};

use thiserror::Error;

/// Errors that end a probe run.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// Error from this app
    #[error("Probe Error: {message} {location}")]
    Probe {
        message: String,
        location: ErrorLocation,
    },

    /// Error from socket-core (config, connection, request)
    #[error("Core Error: {message} {location}")]
    Core {
        message: String,
        location: ErrorLocation,
    },

    /// The `--payload` argument is not JSON
    #[error("Payload Error: {message} {location}")]
    Payload {
        message: String,
        location: ErrorLocation,
    },
}

impl From<CoreError> for ProbeError {
    #[track_caller]
    fn from(error: CoreError) -> Self {
        ProbeError::Core {
            message: error.to_string(),
            location: ErrorLocation::caller(),
        }
    }
}

impl From<ClientError> for ProbeError {
    #[track_caller]
    fn from(error: ClientError) -> Self {
        ProbeError::from(CoreError::from(error))
    }
}

impl From<ConfigError> for ProbeError {
    #[track_caller]
    fn from(error: ConfigError) -> Self {
        ProbeError::from(CoreError::from(error))
    }
}
