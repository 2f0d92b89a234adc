//! In-memory rendering surface.
//!
//! Tracks markers, overlays and the current view without drawing anything.
//! Cloning a [`HeadlessSurface`] shares its state, so a caller can hand one
//! clone to the engine and keep another to inspect what was drawn.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::coord::Coordinate;

use super::{
    MapView, MarkerHandle, MarkerIcon, OverlayHandle, RenderSurface, RouteStyle, SurfaceError,
};

/// A marker as currently shown.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerVisual {
    pub position: Coordinate,
    pub icon: MarkerIcon,
    pub popup: Option<String>,
    pub tooltip: Option<String>,
}

/// A route overlay as currently shown.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayVisual {
    pub origin: Coordinate,
    pub destination: Coordinate,
    pub profile: String,
    pub line: Vec<Coordinate>,
    pub style: Option<RouteStyle>,
}

/// Counters of side effects applied to the surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SurfaceStats {
    pub markers_created: u64,
    pub markers_moved: u64,
    pub markers_removed: u64,
    pub popups_bound: u64,
    pub tooltips_bound: u64,
    pub overlays_added: u64,
    pub overlays_removed: u64,
    pub routes_drawn: u64,
    pub pans: u64,
    pub fits: u64,
}

#[derive(Debug, Default)]
struct HeadlessState {
    initialized: bool,
    released: bool,
    /// Number of `is_ready` polls that report "not ready" after initialization.
    not_ready_polls: u32,
    next_id: u64,
    view: Option<(Coordinate, u8)>,
    /// South-west and north-east corners of the last fitted area.
    bounds: Option<(Coordinate, Coordinate)>,
    markers: BTreeMap<MarkerHandle, MarkerVisual>,
    overlays: BTreeMap<OverlayHandle, OverlayVisual>,
    stats: SurfaceStats,
}

impl HeadlessState {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Rendering surface that keeps its visuals in memory.
#[derive(Debug, Clone, Default)]
pub struct HeadlessSurface {
    inner: Arc<Mutex<HeadlessState>>,
}

impl HeadlessSurface {
    /// Creates a surface that is ready as soon as it is initialized.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a surface that reports "not ready" for the first `polls`
    /// readiness checks after initialization, like a map still loading tiles.
    pub fn with_ready_after(polls: u32) -> Self {
        let surface = Self::new();
        surface.inner.lock().not_ready_polls = polls;
        surface
    }

    /// All live markers.
    pub fn markers(&self) -> Vec<MarkerVisual> {
        self.inner.lock().markers.values().cloned().collect()
    }

    /// Live markers with the given icon.
    pub fn markers_with_icon(&self, icon: MarkerIcon) -> Vec<MarkerVisual> {
        self.inner
            .lock()
            .markers
            .values()
            .filter(|m| m.icon == icon)
            .cloned()
            .collect()
    }

    /// All live route overlays.
    pub fn overlays(&self) -> Vec<OverlayVisual> {
        self.inner.lock().overlays.values().cloned().collect()
    }

    /// Current center and zoom, if initialized.
    pub fn view(&self) -> Option<(Coordinate, u8)> {
        self.inner.lock().view
    }

    /// South-west and north-east corners of the last `fit_bounds` call.
    pub fn fitted_bounds(&self) -> Option<(Coordinate, Coordinate)> {
        self.inner.lock().bounds
    }

    /// Side-effect counters.
    pub fn stats(&self) -> SurfaceStats {
        self.inner.lock().stats
    }

    /// Returns true once [`RenderSurface::release`] has been called.
    pub fn is_released(&self) -> bool {
        self.inner.lock().released
    }
}

impl RenderSurface for HeadlessSurface {
    fn initialize(&mut self, view: &MapView) -> Result<(), SurfaceError> {
        let mut state = self.inner.lock();
        if state.released {
            return Err(SurfaceError::Initialization(
                "surface has been released".to_string(),
            ));
        }
        state.initialized = true;
        state.view = Some((view.center, view.zoom));
        debug!(
            center = %view.center,
            zoom = view.zoom,
            tiles = %view.tile_layer.url_template,
            "Headless surface initialized"
        );
        Ok(())
    }

    fn is_ready(&self) -> bool {
        let mut state = self.inner.lock();
        if !state.initialized || state.released {
            return false;
        }
        if state.not_ready_polls > 0 {
            state.not_ready_polls -= 1;
            return false;
        }
        true
    }

    fn create_marker(&mut self, at: Coordinate, icon: MarkerIcon) -> MarkerHandle {
        let mut state = self.inner.lock();
        let handle = MarkerHandle(state.next_id());
        state.markers.insert(
            handle,
            MarkerVisual {
                position: at,
                icon,
                popup: None,
                tooltip: None,
            },
        );
        state.stats.markers_created += 1;
        trace!(%handle, position = %at, ?icon, "Marker created");
        handle
    }

    fn update_marker_position(&mut self, marker: MarkerHandle, at: Coordinate) {
        let mut guard = self.inner.lock();
        let state = &mut *guard;
        if let Some(visual) = state.markers.get_mut(&marker) {
            visual.position = at;
            state.stats.markers_moved += 1;
        }
    }

    fn bind_popup(&mut self, marker: MarkerHandle, text: &str) {
        let mut guard = self.inner.lock();
        let state = &mut *guard;
        if let Some(visual) = state.markers.get_mut(&marker) {
            visual.popup = Some(text.to_string());
            state.stats.popups_bound += 1;
        }
    }

    fn bind_tooltip(&mut self, marker: MarkerHandle, text: &str) {
        let mut guard = self.inner.lock();
        let state = &mut *guard;
        if let Some(visual) = state.markers.get_mut(&marker) {
            visual.tooltip = Some(text.to_string());
            state.stats.tooltips_bound += 1;
        }
    }

    fn remove_marker(&mut self, marker: MarkerHandle) {
        let mut state = self.inner.lock();
        if state.markers.remove(&marker).is_some() {
            state.stats.markers_removed += 1;
            trace!(handle = %marker, "Marker removed");
        }
    }

    fn add_route_overlay(
        &mut self,
        origin: Coordinate,
        destination: Coordinate,
        profile: &str,
    ) -> OverlayHandle {
        let mut state = self.inner.lock();
        let handle = OverlayHandle(state.next_id());
        state.overlays.insert(
            handle,
            OverlayVisual {
                origin,
                destination,
                profile: profile.to_string(),
                line: Vec::new(),
                style: None,
            },
        );
        state.stats.overlays_added += 1;
        trace!(%handle, profile, "Route overlay added");
        handle
    }

    fn draw_route(&mut self, overlay: OverlayHandle, geometry: &[Coordinate], style: RouteStyle) {
        let mut guard = self.inner.lock();
        let state = &mut *guard;
        if let Some(visual) = state.overlays.get_mut(&overlay) {
            visual.line = geometry.to_vec();
            visual.style = Some(style);
            state.stats.routes_drawn += 1;
        }
    }

    fn remove_route_overlay(&mut self, overlay: OverlayHandle) -> Result<(), SurfaceError> {
        let mut state = self.inner.lock();
        match state.overlays.remove(&overlay) {
            Some(_) => {
                state.stats.overlays_removed += 1;
                trace!(handle = %overlay, "Route overlay removed");
                Ok(())
            }
            None => Err(SurfaceError::UnknownHandle {
                kind: "overlay",
                id: overlay.0,
            }),
        }
    }

    fn pan_to(&mut self, at: Coordinate, zoom: u8) {
        let mut state = self.inner.lock();
        state.view = Some((at, zoom));
        state.stats.pans += 1;
    }

    fn fit_bounds(&mut self, points: &[Coordinate]) {
        let Some(first) = points.first() else {
            return;
        };
        let (south_west, north_east) = points.iter().fold((*first, *first), |(sw, ne), p| {
            (
                Coordinate::new(sw.latitude.min(p.latitude), sw.longitude.min(p.longitude)),
                Coordinate::new(ne.latitude.max(p.latitude), ne.longitude.max(p.longitude)),
            )
        });

        let mut state = self.inner.lock();
        state.bounds = Some((south_west, north_east));
        state.stats.fits += 1;
        trace!(%south_west, %north_east, "View fitted to bounds");
    }

    fn release(&mut self) {
        let mut state = self.inner.lock();
        state.markers.clear();
        state.overlays.clear();
        state.released = true;
        state.initialized = false;
        debug!("Headless surface released");
    }
}
