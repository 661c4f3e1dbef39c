//! Logging for the socket probe.
//!
//! Colored records go to stderr and plain ones to `socket-probe.log`, leaving
//! stdout to responses so they can be piped.

use crate::error::ProbeError;

use common::ErrorLocation;

use std::fs::File;
use std::path::Path;
use std::sync::Once;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::SystemTime;

use fern::Dispatch;
use fern::colors::Color::{Blue, Green, Magenta, Red, Yellow};
use fern::colors::ColoredLevelConfig;
use humantime::{format_rfc3339_millis, format_rfc3339_seconds};
use log::{LevelFilter, info, warn};

static INIT_ONCE: Once = Once::new();
static INIT_REQUESTED: AtomicBool = AtomicBool::new(false);

pub const LOG_FILE_NAME: &str = "socket-probe.log";

#[cfg(debug_assertions)]
const LOG_LEVEL: LevelFilter = LevelFilter::Debug;

#[cfg(not(debug_assertions))]
const LOG_LEVEL: LevelFilter = LevelFilter::Info;

/// Crates whose debug output is one record per frame.
const QUIET_TARGETS: [&str; 2] = ["tungstenite", "tokio_tungstenite"];

/// Start logging to stderr and to `log_dir/socket-probe.log`.
///
/// Only the first call installs the logger; later calls warn and return Ok.
///
/// # Errors
///
/// Fails when the directory or log file cannot be created, or when another
/// global logger is already installed.
pub fn initialize(log_dir: &Path) -> Result<(), ProbeError> {
    if INIT_REQUESTED.swap(true, Ordering::SeqCst) {
        warn!("Logger already initialized");
        return Ok(());
    }

    let mut result = Ok(());
    INIT_ONCE.call_once(|| {
        result = initialize_internal(log_dir);
    });

    if result.is_ok() {
        info!("Logging at {LOG_LEVEL:?} to {}", log_dir.join(LOG_FILE_NAME).display());
    }

    result
}

#[track_caller]
pub(crate) fn initialize_internal(log_dir: &Path) -> Result<(), ProbeError> {
    std::fs::create_dir_all(log_dir).map_err(|e| ProbeError::Probe {
        message: format!("Failed to create log directory {}: {e}", log_dir.display()),
        location: ErrorLocation::caller(),
    })?;

    let log_file = fern::log_file(log_dir.join(LOG_FILE_NAME)).map_err(|e| ProbeError::Probe {
        message: format!("Failed to open log file in {}: {e}", log_dir.display()),
        location: ErrorLocation::caller(),
    })?;

    QUIET_TARGETS
        .iter()
        .fold(Dispatch::new().level(LOG_LEVEL), |dispatch, target| {
            dispatch.level_for(*target, LevelFilter::Info)
        })
        .chain(console_dispatch())
        .chain(file_dispatch(log_file))
        .apply()
        .map_err(|e| ProbeError::Probe {
            message: format!("Failed to install logger: {e}"),
            location: ErrorLocation::caller(),
        })
}

/// Short colored lines for a terminal.
fn console_dispatch() -> Dispatch {
    let colors = ColoredLevelConfig::new()
        .trace(Magenta)
        .debug(Blue)
        .info(Green)
        .warn(Yellow)
        .error(Red);

    Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "{time} {level} {message}",
                time = format_rfc3339_seconds(SystemTime::now()),
                level = colors.color(record.level()),
            ))
        })
        .chain(std::io::stderr())
}

/// Full records with target and source position.
fn file_dispatch(log_file: File) -> Dispatch {
    Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{time} {level} {target}] {message} [{file}:{line}]",
                time = format_rfc3339_millis(SystemTime::now()),
                level = record.level(),
                target = record.target(),
                file = record.file().unwrap_or("unknown"),
                line = record.line().unwrap_or(0),
            ))
        })
        .chain(log_file)
}
