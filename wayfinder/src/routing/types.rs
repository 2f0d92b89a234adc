//! Core routing types: travel modes, requests, outcomes and errors.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::coord::Coordinate;

/// Boxed future type for dyn-compatible async methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Travel mode selected by the viewer.
///
/// Exactly one mode is active at a time. The routing service calls this a
/// "profile"; see [`TravelMode::profile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    #[default]
    Driving,
    Walking,
}

impl TravelMode {
    /// Routing service profile name for this mode.
    pub fn profile(&self) -> &'static str {
        match self {
            TravelMode::Driving => "driving",
            TravelMode::Walking => "foot",
        }
    }

    /// Word used at the end of a route summary.
    pub fn verb(&self) -> &'static str {
        match self {
            TravelMode::Driving => "drive",
            TravelMode::Walking => "walk",
        }
    }

    /// Lenient conversion from a profile or mode name.
    ///
    /// Anything that is not recognisably a walking mode maps to `Driving`.
    pub fn from_profile(name: &str) -> Self {
        name.parse().unwrap_or_default()
    }
}

impl fmt::Display for TravelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TravelMode::Driving => write!(f, "driving"),
            TravelMode::Walking => write!(f, "walking"),
        }
    }
}

/// Error returned when a travel mode string is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid travel mode '{0}' (expected 'driving' or 'foot')")]
pub struct ParseTravelModeError(pub String);

impl FromStr for TravelMode {
    type Err = ParseTravelModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "driving" | "drive" | "car" => Ok(TravelMode::Driving),
            "foot" | "walking" | "walk" => Ok(TravelMode::Walking),
            _ => Err(ParseTravelModeError(s.to_string())),
        }
    }
}

/// Maps any mode name to the routing profile, defaulting to `"driving"`.
pub fn profile_for(mode: &str) -> &'static str {
    TravelMode::from_profile(mode).profile()
}

/// The inputs that determine a route: both endpoints plus the mode.
///
/// Two snapshots that compare equal always produce the same request, which
/// is what duplicate suppression keys on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteSnapshot {
    pub origin: Coordinate,
    pub destination: Coordinate,
    pub mode: TravelMode,
}

/// A single logical routing attempt.
///
/// `generation` increases by one per issued request and is the only thing
/// used to tell a current result from a stale one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteRequest {
    pub origin: Coordinate,
    pub destination: Coordinate,
    pub mode: TravelMode,
    pub generation: u64,
}

impl RouteRequest {
    /// Builds a request for a snapshot under the given generation.
    pub fn from_snapshot(snapshot: RouteSnapshot, generation: u64) -> Self {
        Self {
            origin: snapshot.origin,
            destination: snapshot.destination,
            mode: snapshot.mode,
            generation,
        }
    }

    /// Routing service profile for this request.
    pub fn profile(&self) -> &'static str {
        self.mode.profile()
    }
}

/// First route alternative returned by the routing service.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Route {
    /// Total route length in meters.
    pub distance_meters: f64,
    /// Total travel time in seconds.
    pub duration_seconds: f64,
    /// Route line, may be empty if the service returned no geometry.
    pub geometry: Vec<Coordinate>,
}

impl Route {
    /// Creates a route without geometry.
    pub fn new(distance_meters: f64, duration_seconds: f64) -> Self {
        Self {
            distance_meters,
            duration_seconds,
            geometry: Vec::new(),
        }
    }

    /// Attaches a route line.
    pub fn with_geometry(mut self, geometry: Vec<Coordinate>) -> Self {
        self.geometry = geometry;
        self
    }
}

/// Settled result of a routing attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteOutcome {
    Success(Route),
    Failure { message: String },
}

impl From<Result<Route, RoutingError>> for RouteOutcome {
    fn from(result: Result<Route, RoutingError>) -> Self {
        match result {
            Ok(route) => RouteOutcome::Success(route),
            Err(e) => RouteOutcome::Failure {
                message: e.to_string(),
            },
        }
    }
}

/// Routing status exposed to observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoutingStatus {
    #[default]
    Idle,
    Computing,
    Ready,
    Error,
}

impl fmt::Display for RoutingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoutingStatus::Idle => write!(f, "idle"),
            RoutingStatus::Computing => write!(f, "computing"),
            RoutingStatus::Ready => write!(f, "ready"),
            RoutingStatus::Error => write!(f, "error"),
        }
    }
}

/// Errors from the routing service layer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RoutingError {
    /// No routing service endpoint is configured.
    #[error("Routing service URL is not configured.")]
    NotConfigured,

    /// Transport or HTTP status failure.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The response body could not be understood.
    #[error("Invalid routing response: {0}")]
    Decode(String),

    /// The service answered but found no route.
    #[error("{0}")]
    NoRoute(String),
}

/// Source of routes.
///
/// Implementations perform the network call; the engine only ever sees the
/// settled result. Uses `Pin<Box<dyn Future>>` so routers can be shared as
/// `Arc<dyn Router>`.
pub trait Router: Send + Sync {
    /// Computes the route for a request.
    fn route<'a>(&'a self, request: &'a RouteRequest) -> BoxFuture<'a, Result<Route, RoutingError>>;

    /// Short name for logging.
    fn name(&self) -> &'static str;
}
