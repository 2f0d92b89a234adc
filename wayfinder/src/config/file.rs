//! Configuration file handling for ~/.wayfinder/config.ini.

use std::path::{Path, PathBuf};
use std::time::Duration;

use ini::Ini;
use thiserror::Error;
use tracing::debug;

use super::{
    EngineConfig, RoutingConfig, DEFAULT_DEBOUNCE, DEFAULT_MAX_READY_RETRIES,
    DEFAULT_READY_RETRY_DELAY,
};
use crate::routing::DEFAULT_HTTP_TIMEOUT;

/// Environment variable that overrides `[routing] service_url`.
pub const SERVICE_URL_ENV: &str = "OSRM_SERVICE_URL";

/// Configuration file errors.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// Failed to read or parse the config file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] ini::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {section}.{key} = '{value}' - {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },
}

/// `[routing]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutingSettings {
    pub service_url: Option<String>,
    /// HTTP timeout in seconds.
    pub timeout: u64,
}

impl Default for RoutingSettings {
    fn default() -> Self {
        Self {
            service_url: None,
            timeout: DEFAULT_HTTP_TIMEOUT.as_secs(),
        }
    }
}

/// `[engine]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    pub debounce_ms: u64,
    pub ready_retry_ms: u64,
    pub max_ready_retries: u32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE.as_millis() as u64,
            ready_retry_ms: DEFAULT_READY_RETRY_DELAY.as_millis() as u64,
            max_ready_retries: DEFAULT_MAX_READY_RETRIES,
        }
    }
}

/// Contents of the configuration file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigFile {
    pub routing: RoutingSettings,
    pub engine: EngineSettings,
}

impl ConfigFile {
    /// Load configuration from the default path (~/.wayfinder/config.ini),
    /// then apply environment overrides.
    pub fn load() -> Result<Self, ConfigFileError> {
        let mut config = Self::load_from(&config_file_path())?;
        config.apply_service_url_override(std::env::var(SERVICE_URL_ENV).ok());
        Ok(config)
    }

    /// Load configuration from a specific path.
    ///
    /// If the file doesn't exist, returns defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path)?;
        super::parser::parse_ini(&ini)
    }

    /// Parse configuration from INI text.
    pub fn parse(text: &str) -> Result<Self, ConfigFileError> {
        let ini = Ini::load_from_str(text).map_err(ini::Error::Parse)?;
        super::parser::parse_ini(&ini)
    }

    /// Replaces the service URL with a non-blank override value.
    pub fn apply_service_url_override(&mut self, value: Option<String>) {
        if let Some(url) = value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
            debug!(url = %url, "Routing service URL overridden from environment");
            self.routing.service_url = Some(url);
        }
    }

    /// Engine settings with defaults for everything the file does not cover.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig::default()
            .with_debounce(Duration::from_millis(self.engine.debounce_ms))
            .with_ready_retry(
                Duration::from_millis(self.engine.ready_retry_ms),
                self.engine.max_ready_retries,
            )
    }

    /// Routing service settings.
    pub fn routing_config(&self) -> RoutingConfig {
        RoutingConfig {
            service_url: self.routing.service_url.clone(),
            timeout: Duration::from_secs(self.routing.timeout),
            ..Default::default()
        }
    }
}

/// Get the path to the config directory (~/.wayfinder).
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".wayfinder")
}

/// Get the path to the config file (~/.wayfinder/config.ini).
pub fn config_file_path() -> PathBuf {
    config_directory().join("config.ini")
}
