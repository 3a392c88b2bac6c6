mod cli;
mod demo;
mod logging;
mod settings;
mod stress;

use std::process::ExitCode;

use clap::Parser;
use log::{error, info};

use cli::{CliArgs, Command};
use settings::AppConfig;

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();

    // Logging depends on the config, so config errors go straight to stderr
    let config = match AppConfig::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {}", e);
        return ExitCode::FAILURE;
    }
    info!("Using dispatcher config {:?}", config.dispatcher);

    let result = match args.command {
        Command::Demo => demo::run(config.dispatcher).await,
        Command::Stress { threads, subscriptions } => stress::run(config.dispatcher, threads, subscriptions),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Command failed: {}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
