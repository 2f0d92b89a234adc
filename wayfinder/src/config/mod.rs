//! Configuration for the engine and the routing service.
//!
//! [`EngineConfig`] and [`RoutingConfig`] are what the library consumes.
//! [`ConfigFile`] is the on-disk form (`~/.wayfinder/config.ini`) and converts
//! into both.

mod file;
mod parser;

pub use file::{
    config_directory, config_file_path, ConfigFile, ConfigFileError, EngineSettings,
    RoutingSettings, SERVICE_URL_ENV,
};

use std::time::Duration;

use crate::routing::{CoordinatorConfig, DEFAULT_HTTP_TIMEOUT, DEFAULT_USER_AGENT};
use crate::surface::{MapView, DEFAULT_USER_ZOOM};

/// Default debounce window for route recomputation.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(150);

/// Default delay between map readiness checks.
pub const DEFAULT_READY_RETRY_DELAY: Duration = Duration::from_millis(200);

/// Default number of readiness retries before reporting an error.
pub const DEFAULT_MAX_READY_RETRIES: u32 = 25;

/// Engine session settings.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Quiescence window before a changed route is requested.
    pub debounce: Duration,
    /// Delay between map readiness checks.
    pub ready_retry_delay: Duration,
    /// Readiness retries before giving up.
    pub max_ready_retries: u32,
    /// Initial map view.
    pub view: MapView,
    /// Zoom used when panning to the viewer's first position.
    pub user_zoom: u8,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            ready_retry_delay: DEFAULT_READY_RETRY_DELAY,
            max_ready_retries: DEFAULT_MAX_READY_RETRIES,
            view: MapView::default(),
            user_zoom: DEFAULT_USER_ZOOM,
        }
    }
}

impl EngineConfig {
    /// Set the debounce window.
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Set the readiness retry delay and bound.
    pub fn with_ready_retry(mut self, delay: Duration, max_retries: u32) -> Self {
        self.ready_retry_delay = delay;
        self.max_ready_retries = max_retries;
        self
    }

    /// Timing settings for the route coordinator.
    pub fn coordinator(&self) -> CoordinatorConfig {
        CoordinatorConfig {
            debounce: self.debounce,
            ready_retry_delay: self.ready_retry_delay,
            max_ready_retries: self.max_ready_retries,
        }
    }
}

/// Routing service settings.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutingConfig {
    /// Base URL of the OSRM service. `None` disables routing.
    pub service_url: Option<String>,
    /// HTTP timeout per request.
    pub timeout: Duration,
    /// `User-Agent` header sent to the service.
    pub user_agent: String,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            service_url: None,
            timeout: DEFAULT_HTTP_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl RoutingConfig {
    pub fn new(service_url: impl Into<String>) -> Self {
        Self {
            service_url: Some(service_url.into()),
            ..Default::default()
        }
    }

    /// Returns the service URL if one is configured and non-blank.
    pub fn endpoint(&self) -> Option<&str> {
        self.service_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}
