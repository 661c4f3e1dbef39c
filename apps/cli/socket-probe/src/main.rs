use socket_probe::cli::Cli;
use socket_probe::env::try_load_dotenv;
use socket_probe::error::ProbeError;
use socket_probe::logger::initialize as LoggerInitialize;
use socket_probe::probe;

use std::process::ExitCode;

use clap::Parser;
use log::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match start(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn start(cli: &Cli) -> Result<(), ProbeError> {
    let log_dir = cli.log_dir()?;

    // Logger first
    LoggerInitialize(&log_dir)?;

    info!("socket-probe {} starting", env!("CARGO_PKG_VERSION"));
    info!("Log directory: {}", log_dir.display());

    try_load_dotenv();

    probe::run(cli).await
}
