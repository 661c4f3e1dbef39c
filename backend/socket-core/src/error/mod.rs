pub mod client;
pub mod codec;
pub mod config;
pub mod correlation;

pub use client::ClientError;
pub use codec::CodecError;
pub use config::ConfigError;
pub use correlation::CorrelationError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Correlation(#[from] CorrelationError),
}
