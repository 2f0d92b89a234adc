//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::process;

use wayfinder::config::ConfigFileError;
use wayfinder::routing::RoutingError;
use wayfinder::session::EngineError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Failed to load the config file
    ConfigFile(ConfigFileError),
    /// Routing service request failed
    Routing(RoutingError),
    /// Engine session failed
    Engine(EngineError),
    /// Runtime or signal handler setup failed
    Runtime(String),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::Routing(RoutingError::NotConfigured) => {
                eprintln!();
                eprintln!("Set the routing service in one of:");
                eprintln!("  1. --service-url https://router.project-osrm.org");
                eprintln!("  2. OSRM_SERVICE_URL environment variable");
                eprintln!("  3. [routing] service_url in ~/.wayfinder/config.ini");
            }
            CliError::Routing(RoutingError::Http(_)) => {
                eprintln!();
                eprintln!("Check that the routing service is reachable and supports the OSRM v1 API.");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::ConfigFile(e) => write!(f, "{}", e),
            CliError::Routing(e) => write!(f, "Routing failed: {}", e),
            CliError::Engine(e) => write!(f, "{}", e),
            CliError::Runtime(msg) => write!(f, "Runtime error: {}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::ConfigFile(e) => Some(e),
            CliError::Routing(e) => Some(e),
            CliError::Engine(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::ConfigFile(e)
    }
}

impl From<RoutingError> for CliError {
    fn from(e: RoutingError) -> Self {
        CliError::Routing(e)
    }
}

impl From<EngineError> for CliError {
    fn from(e: EngineError) -> Self {
        CliError::Engine(e)
    }
}
