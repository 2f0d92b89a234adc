//! Common types and utilities shared across CLI commands.

use std::sync::Arc;

use clap::ValueEnum;
use wayfinder::config::RoutingConfig;
use wayfinder::routing::{AsyncReqwestClient, OsrmRouter, Router, TravelMode};

use crate::error::CliError;

/// Travel mode selection for CLI arguments.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum ModeArg {
    /// Car routing (OSRM "driving" profile)
    Driving,
    /// Pedestrian routing (OSRM "foot" profile)
    #[value(alias = "foot")]
    Walking,
}

impl From<ModeArg> for TravelMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Driving => TravelMode::Driving,
            ModeArg::Walking => TravelMode::Walking,
        }
    }
}

/// Build an OSRM router from routing settings.
///
/// Returns `None` when no service URL is configured.
pub fn build_router(routing: &RoutingConfig) -> Result<Option<Arc<dyn Router>>, CliError> {
    let Some(endpoint) = routing.endpoint() else {
        return Ok(None);
    };
    let client = AsyncReqwestClient::with_settings(routing.timeout, &routing.user_agent)?;
    Ok(Some(Arc::new(OsrmRouter::new(client, endpoint))))
}
