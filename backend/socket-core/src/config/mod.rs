//! Client settings persisted as `socket-client.json`.

use crate::error::config::ConfigError;

use common::ErrorLocation;
use models::{ConnectOptions, ConnectOptionsBuilder};

use std::io::ErrorKind;
use std::num::ParseIntError;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{info, warn};
use serde::{Deserialize, Serialize};

const CONFIG_FILE_NAME: &str = "socket-client.json";
const CONFIG_VERSION: u32 = 1;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_PATH: &str = "/ws";
pub const DEFAULT_ADDRESS: &str =
    const_format::concatcp!("ws://", DEFAULT_HOST, ":", DEFAULT_PORT, DEFAULT_PATH);

pub const ENV_ADDRESS: &str = "SOCKET_CORE_ADDRESS";
pub const ENV_RECONNECT: &str = "SOCKET_CORE_RECONNECT";
pub const ENV_RECONNECT_DELAY_MS: &str = "SOCKET_CORE_RECONNECT_DELAY_MS";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default = "default_address")]
    pub address: String,

    #[serde(default = "default_reconnect")]
    pub reconnect: bool,

    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,

    /// Enables exponential backoff up to this delay.
    #[serde(default)]
    pub max_reconnect_delay_ms: Option<u64>,

    #[serde(default)]
    pub request_timeout_ms: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            address: default_address(),
            reconnect: default_reconnect(),
            reconnect_delay_ms: default_reconnect_delay_ms(),
            max_reconnect_delay_ms: None,
            request_timeout_ms: None,
        }
    }
}

fn default_version() -> u32 {
    CONFIG_VERSION
}
fn default_address() -> String {
    DEFAULT_ADDRESS.to_string()
}
fn default_reconnect() -> bool {
    true
}
fn default_reconnect_delay_ms() -> u64 {
    1_000
}

impl ClientConfig {
    /// Read `socket-client.json` from `config_dir`.
    ///
    /// A missing file yields the defaults. A file that exists but cannot be
    /// read, parsed or validated is an error rather than silently replaced.
    pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        let path = config_path(config_dir);

        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("No client config at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => {
                warn!("Cannot read {}: {e}", path.display());
                return Err(ConfigError::Read {
                    path,
                    source: e,
                    location: ErrorLocation::caller(),
                });
            }
        };

        let config: Self = match serde_json::from_str(&contents) {
            Ok(config) => config,
            Err(e) => {
                warn!("Cannot parse {}: {e}", path.display());
                return Err(ConfigError::Parse {
                    path,
                    reason: e.to_string(),
                    location: ErrorLocation::caller(),
                });
            }
        };

        config.validate()?;
        info!("Client config loaded from {}", path.display());

        Ok(config)
    }

    /// Write `socket-client.json` into `config_dir`, creating the directory.
    ///
    /// The file is replaced atomically so a crash never leaves half a config.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        self.validate()?;

        let json = serde_json::to_string_pretty(self).map_err(|e| ConfigError::Serialize {
            reason: e.to_string(),
            location: ErrorLocation::caller(),
        })?;

        std::fs::create_dir_all(config_dir)
            .map_err(|e| ConfigError::write(config_dir.to_path_buf(), e))?;

        let path = config_path(config_dir);
        replace_file(&path, &json)?;
        info!("Client config saved to {}", path.display());

        Ok(())
    }

    /// Check that these settings describe a usable connection.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=CONFIG_VERSION).contains(&self.version) {
            return Err(ConfigError::invalid(format!(
                "unsupported version {} (this build reads up to {CONFIG_VERSION})",
                self.version
            )));
        }

        if self.request_timeout_ms == Some(0) {
            return Err(ConfigError::invalid("request_timeout_ms cannot be 0"));
        }

        self.connect_options().map(drop)
    }

    /// Apply `SOCKET_CORE_*` environment variables on top of the file values.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides resolved by `lookup`, then validate the result.
    ///
    /// `lookup` receives the variable name and returns its value, if set.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(address) = lookup(ENV_ADDRESS) {
            info!("{ENV_ADDRESS} overrides address with {address}");
            self.address = address;
        }

        if let Some(value) = lookup(ENV_RECONNECT) {
            self.reconnect = parse_flag(&value).ok_or_else(|| ConfigError::Override {
                variable: ENV_RECONNECT,
                reason: String::from("expected true or false"),
                value: value.clone(),
                location: ErrorLocation::caller(),
            })?;
        }

        if let Some(value) = lookup(ENV_RECONNECT_DELAY_MS) {
            self.reconnect_delay_ms = value.trim().parse().map_err(|e: ParseIntError| {
                ConfigError::Override {
                    variable: ENV_RECONNECT_DELAY_MS,
                    reason: e.to_string(),
                    value: value.clone(),
                    location: ErrorLocation::caller(),
                }
            })?;
        }

        self.validate()
    }

    /// Validated connection parameters for [`crate::SocketClient::connect`].
    pub fn connect_options(&self) -> Result<ConnectOptions, ConfigError> {
        let builder = ConnectOptionsBuilder::default()
            .with_address(self.address.as_str())
            .with_reconnect(self.reconnect)
            .with_reconnect_delay(Duration::from_millis(self.reconnect_delay_ms));

        let builder = match self.max_reconnect_delay_ms {
            Some(max) => builder.with_max_reconnect_delay(Duration::from_millis(max)),
            None => builder,
        };

        builder
            .build()
            .map_err(|e| ConfigError::invalid(e.to_string()))
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }
}

fn config_path(config_dir: &Path) -> PathBuf {
    config_dir.join(CONFIG_FILE_NAME)
}

/// Write `contents` next to `path`, then rename over it.
fn replace_file(path: &Path, contents: &str) -> Result<(), ConfigError> {
    let staging = path.with_extension("json.tmp");

    std::fs::write(&staging, contents).map_err(|e| ConfigError::write(staging.clone(), e))?;
    std::fs::rename(&staging, path).map_err(|e| ConfigError::write(path.to_path_buf(), e))
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
