use common::ErrorLocation;

use std::path::PathBuf;

use thiserror::Error;

/// Failures loading, saving or validating `socket-client.json`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config Read Error: cannot read {path}: {source} {location}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
        location: ErrorLocation,
    },

    #[error("Config Parse Error: {path} is not a valid client config: {reason} {location}")]
    Parse {
        path: PathBuf,
        reason: String,
        location: ErrorLocation,
    },

    #[error("Config Write Error: cannot write {path}: {source} {location}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
        location: ErrorLocation,
    },

    #[error("Config Serialize Error: {reason} {location}")]
    Serialize {
        reason: String,
        location: ErrorLocation,
    },

    #[error("Config Validation Error: {reason} {location}")]
    Invalid {
        reason: String,
        location: ErrorLocation,
    },

    #[error("Config Override Error: {variable}={value}: {reason} {location}")]
    Override {
        variable: &'static str,
        value: String,
        reason: String,
        location: ErrorLocation,
    },
}

impl ConfigError {
    #[track_caller]
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            reason: reason.into(),
            location: ErrorLocation::caller(),
        }
    }

    #[track_caller]
    pub(crate) fn write(path: PathBuf, source: std::io::Error) -> Self {
        ConfigError::Write {
            path,
            source,
            location: ErrorLocation::caller(),
        }
    }
}
