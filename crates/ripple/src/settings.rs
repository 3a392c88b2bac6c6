use std::path::Path;

use ripple_core::config::{self, DispatcherConfig};
use serde::{Deserialize, Serialize};

/// Top-level config file for the `ripple` binary
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub dispatcher: DispatcherConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Load from `path` if given, otherwise defaults. Always validated.
    pub fn load(path: Option<&Path>) -> ripple_core::Result<Self> {
        let config: AppConfig = match path {
            Some(path) => config::load_from_path(path)?,
            None => AppConfig::default(),
        };
        config.dispatcher.validate()?;
        if config.logging.level.trim().is_empty() {
            return Err(ripple_core::Error::InvalidConfig("logging.level must not be empty".to_string()));
        }
        Ok(config)
    }
}
