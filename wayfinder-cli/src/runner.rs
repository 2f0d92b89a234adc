//! CLI runner for common setup and operations.
//!
//! Encapsulates logging initialization, config loading and runtime creation
//! to reduce duplication across command handlers.

use std::path::PathBuf;

use tracing::info;
use wayfinder::config::{ConfigFile, RoutingConfig};
use wayfinder::logging::{init_logging, LogOptions, LoggingGuard};

use crate::error::CliError;

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Logging guard - keeps logging active while runner exists
    #[allow(dead_code)]
    logging_guard: LoggingGuard,
    /// Loaded configuration file
    config: ConfigFile,
}

impl CliRunner {
    /// Create a new CLI runner, loading config and initializing logging.
    ///
    /// # Arguments
    ///
    /// * `verbose` - Use debug-level logging when `RUST_LOG` is not set
    /// * `log_file` - Also write logs to this file
    pub fn new(verbose: bool, log_file: Option<PathBuf>) -> Result<Self, CliError> {
        let config = ConfigFile::load()?;

        let mut options =
            LogOptions::default().with_default_level(if verbose { "debug" } else { "info" });
        if let Some(path) = log_file {
            options = options.with_log_file(path);
        }
        let logging_guard =
            init_logging(&options).map_err(|e| CliError::LoggingInit(e.to_string()))?;

        Ok(Self {
            logging_guard,
            config,
        })
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Routing settings with an optional command-line URL taking precedence.
    pub fn routing_config(&self, service_url: Option<String>) -> RoutingConfig {
        let mut routing = self.config.routing_config();
        if let Some(url) = service_url {
            routing.service_url = Some(url);
        }
        routing
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!("Wayfinder v{}", wayfinder::VERSION);
        info!("Wayfinder CLI: {} command", command);
    }

    /// Build the multi-threaded runtime commands run on.
    pub fn runtime(&self) -> Result<tokio::runtime::Runtime, CliError> {
        tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(|e| CliError::Runtime(format!("Failed to create Tokio runtime: {}", e)))
    }
}
