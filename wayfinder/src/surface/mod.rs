//! Rendering surface abstraction.
//!
//! The engine draws through [`RenderSurface`]: two point markers and at most
//! one route overlay. Tile rendering, styling and input handling belong to
//! the implementation. [`HeadlessSurface`] keeps everything in memory and is
//! what the CLI and the tests drive.
//!
//! # Ownership
//!
//! The surface is owned by the engine session. Markers are touched only by
//! the marker sync, the route overlay only by the route coordinator.

mod headless;

pub use headless::{HeadlessSurface, MarkerVisual, OverlayVisual, SurfaceStats};

use std::fmt;

use thiserror::Error;

use crate::coord::Coordinate;

/// Default map center (Vilnius).
pub const DEFAULT_CENTER: Coordinate = Coordinate::new(54.6872, 25.2797);

/// Default zoom level for the initial view.
pub const DEFAULT_ZOOM: u8 = 12;

/// Zoom level used when panning to the viewer's first known position.
pub const DEFAULT_USER_ZOOM: u8 = 14;

/// Default tile URL template (OpenStreetMap).
pub const DEFAULT_TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";

/// Default tile attribution.
pub const DEFAULT_TILE_ATTRIBUTION: &str =
    "&copy; <a href=\"http://osm.org/copyright\">OpenStreetMap</a> contributors";

/// Default maximum tile zoom.
pub const DEFAULT_MAX_ZOOM: u8 = 19;

/// Errors raised by a rendering surface.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SurfaceError {
    /// The surface could not be set up.
    #[error("Map initialization failed: {0}")]
    Initialization(String),

    /// The handle does not refer to a live visual.
    #[error("Unknown {kind} handle {id}")]
    UnknownHandle { kind: &'static str, id: u64 },
}

/// Handle to a marker visual.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerHandle(pub u64);

/// Handle to a route overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OverlayHandle(pub u64);

impl fmt::Display for MarkerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "marker#{}", self.0)
    }
}

impl fmt::Display for OverlayHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "overlay#{}", self.0)
    }
}

/// Marker icon kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MarkerIcon {
    /// The viewer's own position.
    User,
    /// A facility / destination pin.
    #[default]
    Facility,
}

/// Tile layer settings.
#[derive(Debug, Clone, PartialEq)]
pub struct TileLayer {
    pub url_template: String,
    pub attribution: String,
    pub max_zoom: u8,
}

impl Default for TileLayer {
    fn default() -> Self {
        Self {
            url_template: DEFAULT_TILE_URL.to_string(),
            attribution: DEFAULT_TILE_ATTRIBUTION.to_string(),
            max_zoom: DEFAULT_MAX_ZOOM,
        }
    }
}

/// Initial view of the map.
#[derive(Debug, Clone, PartialEq)]
pub struct MapView {
    pub center: Coordinate,
    pub zoom: u8,
    pub tile_layer: TileLayer,
}

impl Default for MapView {
    fn default() -> Self {
        Self {
            center: DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
            tile_layer: TileLayer::default(),
        }
    }
}

/// Route line styling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteStyle {
    pub color: &'static str,
    pub opacity: f32,
    pub weight: u8,
}

impl Default for RouteStyle {
    fn default() -> Self {
        Self {
            color: "#dc3545",
            opacity: 0.8,
            weight: 6,
        }
    }
}

/// Operations the engine needs from a map rendering surface.
///
/// Marker and overlay operations are synchronous and must not block.
pub trait RenderSurface: Send {
    /// Sets up the base view and tile layer. Called once per session.
    fn initialize(&mut self, view: &MapView) -> Result<(), SurfaceError>;

    /// Returns true once the surface can accept overlays.
    fn is_ready(&self) -> bool;

    /// Creates a marker at a position.
    fn create_marker(&mut self, at: Coordinate, icon: MarkerIcon) -> MarkerHandle;

    /// Moves an existing marker.
    fn update_marker_position(&mut self, marker: MarkerHandle, at: Coordinate);

    /// Sets or replaces the marker's popup content.
    fn bind_popup(&mut self, marker: MarkerHandle, text: &str);

    /// Sets or replaces the marker's tooltip content.
    fn bind_tooltip(&mut self, marker: MarkerHandle, text: &str);

    /// Removes a marker.
    fn remove_marker(&mut self, marker: MarkerHandle);

    /// Adds an (initially empty) route overlay between two points.
    fn add_route_overlay(
        &mut self,
        origin: Coordinate,
        destination: Coordinate,
        profile: &str,
    ) -> OverlayHandle;

    /// Draws the computed route line into an overlay.
    fn draw_route(&mut self, overlay: OverlayHandle, geometry: &[Coordinate], style: RouteStyle);

    /// Removes a route overlay.
    fn remove_route_overlay(&mut self, overlay: OverlayHandle) -> Result<(), SurfaceError>;

    /// Centers the view on a point.
    fn pan_to(&mut self, at: Coordinate, zoom: u8);

    /// Fits the view so every point is visible. `points` is never empty.
    fn fit_bounds(&mut self, points: &[Coordinate]);

    /// Releases the surface. No other method is called afterwards.
    fn release(&mut self);
}
