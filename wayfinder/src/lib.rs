//! Wayfinder - map marker and route synchronization engine
//!
//! Keeps a map surface consistent with three independently changing inputs
//! (the viewer's position, a selected destination and a travel mode) while
//! coordinating calls to an OSRM routing service. Rapid input churn is
//! debounced, duplicate requests are suppressed, and results that arrive for
//! a superseded request are discarded.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use wayfinder::config::EngineConfig;
//! use wayfinder::routing::{AsyncReqwestClient, OsrmRouter, SharedRoutingState};
//! use wayfinder::session::{EngineInputs, EngineSession};
//! use wayfinder::sources::{DestinationStore, LocationStore, MapSettingsStore};
//! use wayfinder::surface::HeadlessSurface;
//!
//! let location = LocationStore::new();
//! let destination = DestinationStore::new();
//! let settings = MapSettingsStore::new();
//! let state = Arc::new(SharedRoutingState::new());
//!
//! let router = OsrmRouter::new(AsyncReqwestClient::new()?, "https://router.project-osrm.org");
//! let mut session = EngineSession::start(
//!     EngineConfig::default(),
//!     Box::new(HeadlessSurface::new()),
//!     EngineInputs {
//!         position: location.subscribe(),
//!         destination: destination.subscribe(),
//!         mode: settings.subscribe(),
//!     },
//!     state.clone(),
//!     Some(Arc::new(router)),
//! )?;
//!
//! location.set_position(54.68, 25.28, None)?;
//! // ... select a destination, watch `state.subscribe()` ...
//! session.shutdown().await?;
//! ```

pub mod config;
pub mod coord;
pub mod logging;
pub mod markers;
pub mod routing;
pub mod session;
pub mod sources;
pub mod surface;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
