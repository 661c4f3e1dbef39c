use crate::{ConnectOptionsBuilder, ModelError};

use std::time::Duration;

use url::Url;

/// Delay used when none is configured.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(1);

/// How long to wait before reconnecting after an unexpected closure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconnectStrategy {
    /// Same delay before every attempt.
    Fixed { delay: Duration },

    /// Delay grows from `initial` up to `max` and resets once a connection opens.
    Exponential { initial: Duration, max: Duration },
}

impl ReconnectStrategy {
    /// Delay before the first attempt.
    pub fn initial_delay(&self) -> Duration {
        match self {
            ReconnectStrategy::Fixed { delay } => *delay,
            ReconnectStrategy::Exponential { initial, .. } => *initial,
        }
    }
}

impl Default for ReconnectStrategy {
    fn default() -> Self {
        ReconnectStrategy::Fixed {
            delay: DEFAULT_RECONNECT_DELAY,
        }
    }
}

/// Parameters of one `connect` call, reused unchanged for every reconnect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectOptions {
    pub address: Url,
    pub reconnect: bool,
    pub strategy: ReconnectStrategy,
}

impl ConnectOptions {
    /// Options for `address` with reconnection enabled and the default delay.
    #[track_caller]
    pub fn new(address: &str) -> Result<Self, ModelError> {
        ConnectOptionsBuilder::default().with_address(address).build()
    }

    pub fn builder() -> ConnectOptionsBuilder {
        ConnectOptionsBuilder::default()
    }

    pub fn reconnect_delay(&self) -> Duration {
        self.strategy.initial_delay()
    }
}
