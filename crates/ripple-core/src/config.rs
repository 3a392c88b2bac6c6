use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;

use crate::error::{Error, Result};

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigFormat {
    /// JSON format (.json)
    Json,
    /// YAML format (.yaml, .yml) - requires "yaml-config" feature
    #[cfg(feature = "yaml-config")]
    Yaml,
    /// TOML format (.toml) - requires "toml-config" feature
    #[cfg(feature = "toml-config")]
    Toml,
}

impl ConfigFormat {
    /// Get the file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            ConfigFormat::Json => "json",
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => "yaml",
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => "toml",
        }
    }

    /// Determine format from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| match ext.to_lowercase().as_str() {
                "json" => Some(ConfigFormat::Json),
                #[cfg(feature = "yaml-config")]
                "yaml" | "yml" => Some(ConfigFormat::Yaml),
                #[cfg(feature = "toml-config")]
                "toml" => Some(ConfigFormat::Toml),
                _ => None,
            })
    }
}

/// Settings for one [`EventDispatcher`](crate::event::EventDispatcher)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DispatcherConfig {
    /// Label prefixed to this dispatcher's log lines
    pub name: String,
    /// Log caught handler/filter panics at error level
    pub report_handler_panics: bool,
    /// Maximum number of deferred events; `None` means unbounded
    pub queue_capacity: Option<usize>,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            report_handler_panics: true,
            queue_capacity: None,
        }
    }
}

impl DispatcherConfig {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::InvalidConfig("dispatcher name must not be empty".to_string()));
        }
        if self.queue_capacity == Some(0) {
            return Err(Error::InvalidConfig(
                "queue_capacity must be at least 1 (omit it for an unbounded queue)".to_string(),
            ));
        }
        Ok(())
    }
}

/// Deserialize any config type from a string in the given format
pub fn from_str<T: DeserializeOwned>(data: &str, format: ConfigFormat) -> Result<T> {
    match format {
        ConfigFormat::Json => serde_json::from_str(data).map_err(|e| Error::ConfigDeserialization {
            format: "JSON",
            source: Box::new(e),
        }),
        #[cfg(feature = "yaml-config")]
        ConfigFormat::Yaml => serde_yaml::from_str(data).map_err(|e| Error::ConfigDeserialization {
            format: "YAML",
            source: Box::new(e),
        }),
        #[cfg(feature = "toml-config")]
        ConfigFormat::Toml => toml::from_str(data).map_err(|e| Error::ConfigDeserialization {
            format: "TOML",
            source: Box::new(e),
        }),
    }
}

/// Serialize a config value to a string in the given format
pub fn to_string<T: Serialize>(value: &T, format: ConfigFormat) -> Result<String> {
    match format {
        ConfigFormat::Json => serde_json::to_string_pretty(value).map_err(|e| Error::ConfigSerialization {
            format: "JSON",
            source: Box::new(e),
        }),
        #[cfg(feature = "yaml-config")]
        ConfigFormat::Yaml => serde_yaml::to_string(value).map_err(|e| Error::ConfigSerialization {
            format: "YAML",
            source: Box::new(e),
        }),
        #[cfg(feature = "toml-config")]
        ConfigFormat::Toml => toml::to_string_pretty(value).map_err(|e| Error::ConfigSerialization {
            format: "TOML",
            source: Box::new(e),
        }),
    }
}

/// Load a config file, picking the format from its extension
pub fn load_from_path<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let format = ConfigFormat::from_path(path)
        .ok_or_else(|| Error::UnsupportedConfigFormat { path: path.to_path_buf() })?;
    let content = fs::read_to_string(path).map_err(|source| Error::ConfigIo {
        source,
        path: path.to_path_buf(),
    })?;
    from_str(&content, format)
}
