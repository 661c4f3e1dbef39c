use crate::error::model_error::ModelError;
use crate::{ConnectOptions, ErrorLocation, ReconnectStrategy};

use std::time::Duration;

use url::Url;

const SUPPORTED_SCHEMES: [&str; 2] = ["ws", "wss"];

/// Builder for validated [`ConnectOptions`].
///
/// Reconnection defaults to enabled with a fixed one second delay. Setting a
/// maximum delay switches to exponential backoff starting at the delay.
#[derive(Debug, Default)]
pub struct ConnectOptionsBuilder {
    address: Option<String>,
    reconnect: Option<bool>,
    reconnect_delay: Option<Duration>,
    max_reconnect_delay: Option<Duration>,
}

impl ConnectOptionsBuilder {
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn with_reconnect(mut self, reconnect: bool) -> Self {
        self.reconnect = Some(reconnect);
        self
    }

    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = Some(delay);
        self
    }

    pub fn with_max_reconnect_delay(mut self, max: Duration) -> Self {
        self.max_reconnect_delay = Some(max);
        self
    }

    /// Build the options with validation.
    #[track_caller]
    pub fn build(self) -> Result<ConnectOptions, ModelError> {
        let address = self.address.ok_or_else(|| ModelError::Validation {
            message: String::from("Address is required"),
            location: ErrorLocation::caller(),
        })?;

        if address.is_empty() {
            return Err(ModelError::Validation {
                message: String::from("Address cannot be empty"),
                location: ErrorLocation::caller(),
            });
        }

        let address = Url::parse(&address).map_err(|e| ModelError::InvalidAddress {
            message: format!("Cannot parse address '{address}': {e}"),
            location: ErrorLocation::caller(),
        })?;

        if !SUPPORTED_SCHEMES.contains(&address.scheme()) {
            return Err(ModelError::InvalidAddress {
                message: format!(
                    "Unsupported scheme '{}' (expected ws or wss)",
                    address.scheme()
                ),
                location: ErrorLocation::caller(),
            });
        }

        let delay = self
            .reconnect_delay
            .unwrap_or_else(|| ReconnectStrategy::default().initial_delay());

        if delay.is_zero() {
            return Err(ModelError::Validation {
                message: String::from("Reconnect delay must be non-zero"),
                location: ErrorLocation::caller(),
            });
        }

        let strategy = match self.max_reconnect_delay {
            None => ReconnectStrategy::Fixed { delay },
            Some(max) if max < delay => {
                return Err(ModelError::Validation {
                    message: format!(
                        "Max reconnect delay {max:?} is shorter than reconnect delay {delay:?}"
                    ),
                    location: ErrorLocation::caller(),
                });
            }
            Some(max) => ReconnectStrategy::Exponential {
                initial: delay,
                max,
            },
        };

        Ok(ConnectOptions {
            address,
            reconnect: self.reconnect.unwrap_or(true),
            strategy,
        })
    }
}
