//! Command line interface for the `socket-probe` binary.

use crate::error::ProbeError;

use common::ErrorLocation;
use socket_core::ClientConfig;

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

/// Directory name under the platform config and data directories.
pub const APP_DIR_NAME: &str = "socket-probe";

/// Connect to a socket server, log events, and optionally send one request.
#[derive(Debug, Parser)]
#[command(name = "socket-probe", version, about, long_about = None)]
pub struct Cli {
    /// Directory holding socket-client.json (default: platform config dir)
    #[arg(long, value_name = "DIR")]
    pub config_dir: Option<PathBuf>,

    /// Server address, e.g. ws://127.0.0.1:8080/ws (overrides config and environment)
    #[arg(long, short, value_name = "URL")]
    pub address: Option<String>,

    /// Log every broadcast of EVENT; repeat for more events
    #[arg(long, short, value_name = "EVENT")]
    pub subscribe: Vec<String>,

    /// Send EVENT once connected, print the response and exit
    #[arg(long, short, value_name = "EVENT")]
    pub request: Option<String>,

    /// JSON payload for --request
    #[arg(long, short, value_name = "JSON", requires = "request")]
    pub payload: Option<String>,

    /// Delay before reconnecting, e.g. 500ms or 2s
    #[arg(long, value_name = "DURATION", value_parser = humantime::parse_duration)]
    pub reconnect_delay: Option<Duration>,

    /// Do not reconnect after an unexpected closure
    #[arg(long)]
    pub no_reconnect: bool,

    /// Directory for socket-probe.log (default: platform data dir)
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,
}

impl Cli {
    #[track_caller]
    pub fn config_dir(&self) -> Result<PathBuf, ProbeError> {
        match &self.config_dir {
            Some(dir) => Ok(dir.clone()),
            None => platform_dir(dirs::config_dir(), "config"),
        }
    }

    #[track_caller]
    pub fn log_dir(&self) -> Result<PathBuf, ProbeError> {
        match &self.log_dir {
            Some(dir) => Ok(dir.clone()),
            None => platform_dir(dirs::data_local_dir(), "data").map(|dir| dir.join("logs")),
        }
    }

    /// Apply command line overrides on top of file and environment values.
    pub fn apply_to(&self, config: &mut ClientConfig) {
        if let Some(address) = &self.address {
            config.address = address.clone();
        }

        if self.no_reconnect {
            config.reconnect = false;
        }

        if let Some(delay) = self.reconnect_delay {
            config.reconnect_delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        }
    }
}

#[track_caller]
fn platform_dir(base: Option<PathBuf>, kind: &str) -> Result<PathBuf, ProbeError> {
    base.map(|dir| dir.join(APP_DIR_NAME))
        .ok_or_else(|| ProbeError::Probe {
            message: format!("No platform {kind} directory; pass it explicitly"),
            location: ErrorLocation::caller(),
        })
}
