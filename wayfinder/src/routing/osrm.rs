//! OSRM v1 routing service client.
//!
//! Builds `route/v1/{profile}/{lon},{lat};{lon},{lat}` requests against a
//! configured base URL and decodes the first route alternative.
//!
//! # Example
//!
//! ```ignore
//! use wayfinder::routing::{AsyncReqwestClient, OsrmRouter, Router};
//!
//! let router = OsrmRouter::new(AsyncReqwestClient::new()?, "https://router.project-osrm.org");
//! let route = router.route(&request).await?;
//! println!("{} m in {} s", route.distance_meters, route.duration_seconds);
//! ```

use serde::Deserialize;
use tracing::debug;

use crate::coord::Coordinate;

use super::http::AsyncHttpClient;
use super::types::{BoxFuture, Route, RouteRequest, Router, RoutingError};

/// Response code OSRM uses for success.
const OSRM_OK: &str = "Ok";

/// Message used when the service answers without any route.
pub const NO_ROUTE_MESSAGE: &str = "No route found";

#[derive(Debug, Deserialize)]
struct OsrmResponse {
    code: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    distance: f64,
    duration: f64,
    #[serde(default)]
    geometry: Option<OsrmGeometry>,
}

#[derive(Debug, Deserialize)]
struct OsrmGeometry {
    /// GeoJSON order: `[longitude, latitude]`.
    coordinates: Vec<[f64; 2]>,
}

/// Router backed by an OSRM-compatible HTTP service.
pub struct OsrmRouter<C: AsyncHttpClient> {
    client: C,
    base_url: String,
}

impl<C: AsyncHttpClient> OsrmRouter<C> {
    /// Creates a router for the given service base URL.
    pub fn new(client: C, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    /// Service base URL without trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds the request URL for a route request.
    pub fn route_url(&self, request: &RouteRequest) -> String {
        format!(
            "{}/route/v1/{}/{},{};{},{}?overview=full&geometries=geojson&alternatives=false",
            self.base_url,
            request.profile(),
            request.origin.longitude,
            request.origin.latitude,
            request.destination.longitude,
            request.destination.latitude,
        )
    }

    /// Decodes an OSRM response body into the first route alternative.
    pub fn parse_response(body: &[u8]) -> Result<Route, RoutingError> {
        let response: OsrmResponse =
            serde_json::from_slice(body).map_err(|e| RoutingError::Decode(e.to_string()))?;

        if response.code != OSRM_OK {
            let message = response
                .message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| format!("{} ({})", NO_ROUTE_MESSAGE, response.code));
            return Err(RoutingError::NoRoute(message));
        }

        let first = response
            .routes
            .into_iter()
            .next()
            .ok_or_else(|| RoutingError::NoRoute(NO_ROUTE_MESSAGE.to_string()))?;

        let geometry = first
            .geometry
            .map(|g| {
                g.coordinates
                    .into_iter()
                    .map(|[lon, lat]| Coordinate::new(lat, lon))
                    .filter(Coordinate::is_valid)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Route::new(first.distance, first.duration).with_geometry(geometry))
    }
}

impl<C: AsyncHttpClient> Router for OsrmRouter<C> {
    fn route<'a>(&'a self, request: &'a RouteRequest) -> BoxFuture<'a, Result<Route, RoutingError>> {
        Box::pin(async move {
            let url = self.route_url(request);
            debug!(
                generation = request.generation,
                profile = request.profile(),
                %url,
                "Requesting route"
            );
            let body = self.client.get(&url).await?;
            Self::parse_response(&body)
        })
    }

    fn name(&self) -> &'static str {
        "osrm"
    }
}
