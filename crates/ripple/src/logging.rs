use std::error::Error as StdError;
use std::io;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

use crate::settings::LoggingConfig;

/// Install the global subscriber. `log` records from ripple-core are bridged
/// into it. Output goes to stderr so command output on stdout stays clean.
pub fn init(config: &LoggingConfig) -> Result<(), Box<dyn StdError + Send + Sync>> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level)?,
    };

    let registry = tracing_subscriber::registry().with(filter);
    if config.json {
        registry.with(fmt::layer().json().with_writer(io::stderr)).try_init()?;
    } else {
        registry.with(fmt::layer().with_target(true).with_writer(io::stderr)).try_init()?;
    }
    Ok(())
}
