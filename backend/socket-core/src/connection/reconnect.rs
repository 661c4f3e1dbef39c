use models::ReconnectStrategy;

use std::time::Duration;

use backoff::ExponentialBackoff;
use backoff::backoff::Backoff;

/// Growth factor between consecutive exponential delays.
pub const BACKOFF_MULTIPLIER: f64 = 2.0;

/// Delays between reconnect attempts for one connection task.
#[derive(Debug)]
pub enum ReconnectSchedule {
    Fixed(Duration),
    Exponential(ExponentialBackoff),
}

impl ReconnectSchedule {
    pub fn new(strategy: &ReconnectStrategy) -> Self {
        match *strategy {
            ReconnectStrategy::Fixed { delay } => ReconnectSchedule::Fixed(delay),
            ReconnectStrategy::Exponential { initial, max } => {
                ReconnectSchedule::Exponential(ExponentialBackoff {
                    current_interval: initial,
                    initial_interval: initial,
                    max_interval: max,
                    randomization_factor: 0.0,
                    multiplier: BACKOFF_MULTIPLIER,
                    max_elapsed_time: None,
                    ..Default::default()
                })
            }
        }
    }

    /// Delay before the next attempt.
    pub fn next_delay(&mut self) -> Duration {
        match self {
            ReconnectSchedule::Fixed(delay) => *delay,
            ReconnectSchedule::Exponential(backoff) => backoff
                .next_backoff()
                .unwrap_or(backoff.max_interval),
        }
    }

    /// Start over from the initial delay. Called once a connection opens.
    pub fn reset(&mut self) {
        if let ReconnectSchedule::Exponential(backoff) = self {
            backoff.reset();
        }
    }
}
