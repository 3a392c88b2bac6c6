//! # Ripple Core Errors
//!
//! Defines the crate-wide [`Error`] type.
//!
//! Subsystem errors (currently [`EventSystemError`]) convert into it with `?`;
//! the remaining variants cover loading and validating configuration.
use std::error::Error as StdError;
use std::path::PathBuf;
use std::result::Result as StdResult;

use thiserror::Error as ThisError;

use crate::event::error::EventSystemError;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("Event system error: {0}")]
    EventSystem(#[from] EventSystemError),

    #[error("I/O error reading config '{}': {source}", path.display())]
    ConfigIo {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    #[error("Unknown or unsupported config format for path: {}", path.display())]
    UnsupportedConfigFormat { path: PathBuf },

    #[error("Failed to deserialize config from {format}: {source}")]
    ConfigDeserialization {
        format: &'static str,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    #[error("Failed to serialize config to {format}: {source}")]
    ConfigSerialization {
        format: &'static str,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Generic error with message
    #[error("Error: {0}")]
    Other(String),
}

/// Shorthand for Result with our Error type
pub type Result<T> = StdResult<T, Error>;

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Other(msg.to_string())
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Other(msg)
    }
}
