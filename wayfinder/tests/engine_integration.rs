//! Integration tests for the engine session.
//!
//! These tests drive a full session through the source stores and check what
//! ends up on the headless surface and in the routing state:
//! - Debounce coalescing and duplicate suppression
//! - Stale outcome rejection (last request wins, not last arrival)
//! - Immediate invalidation
//! - Map readiness retry
//! - Missing routing endpoint
//! - Idempotent teardown
//!
//! Time is paused, so every `sleep` advances the clock deterministically.
//!
//! Run with: `cargo test --test engine_integration`

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use wayfinder::config::EngineConfig;
use wayfinder::coord::Coordinate;
use wayfinder::routing::{
    BoxFuture, Route, RouteRequest, Router, RoutingError, RoutingState, RoutingStateSink,
    RoutingStatus, RoutingUpdate, SharedRoutingState, TravelMode,
};
use wayfinder::session::{EngineError, EngineInputs, EngineSession, SessionHandle};
use wayfinder::sources::{
    DestinationStore, Facility, FacilityLocation, LocationStore, MapSettingsStore,
};
use wayfinder::surface::{HeadlessSurface, MapView, MarkerIcon, RenderSurface};

// ============================================================================
// Helpers
// ============================================================================

const ORIGIN: (f64, f64) = (54.68, 25.28);
const TARGET: (f64, f64) = (54.70, 25.30);

type Script = dyn Fn(&RouteRequest) -> (Duration, Result<Route, RoutingError>) + Send + Sync;

/// Router that answers from a script after a simulated network delay.
struct ScriptedRouter {
    script: Box<Script>,
    calls: Mutex<Vec<RouteRequest>>,
}

impl ScriptedRouter {
    fn new(
        script: impl Fn(&RouteRequest) -> (Duration, Result<Route, RoutingError>)
            + Send
            + Sync
            + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            script: Box::new(script),
            calls: Mutex::new(Vec::new()),
        })
    }

    /// Always returns 5000 m / 600 s after 50 ms.
    fn fixed() -> Arc<Self> {
        Self::new(|_| (Duration::from_millis(50), Ok(Route::new(5000.0, 600.0))))
    }

    fn calls(&self) -> Vec<RouteRequest> {
        self.calls.lock().clone()
    }
}

impl Router for ScriptedRouter {
    fn route<'a>(
        &'a self,
        request: &'a RouteRequest,
    ) -> BoxFuture<'a, Result<Route, RoutingError>> {
        Box::pin(async move {
            self.calls.lock().push(*request);
            let (delay, result) = (self.script)(request);
            tokio::time::sleep(delay).await;
            result
        })
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

/// Sink that keeps every update and the folded state.
#[derive(Default)]
struct RecordingSink {
    updates: Mutex<Vec<RoutingUpdate>>,
    state: SharedRoutingState,
}

impl RecordingSink {
    fn updates(&self) -> Vec<RoutingUpdate> {
        self.updates.lock().clone()
    }

    fn state(&self) -> RoutingState {
        self.state.snapshot()
    }
}

impl RoutingStateSink for RecordingSink {
    fn publish(&self, update: RoutingUpdate) {
        self.updates.lock().push(update.clone());
        self.state.publish(update);
    }
}

struct Harness {
    location: LocationStore,
    destination: DestinationStore,
    settings: MapSettingsStore,
    surface: HeadlessSurface,
    sink: Arc<RecordingSink>,
    session: SessionHandle,
}

impl Harness {
    fn start(surface: HeadlessSurface, router: Option<Arc<ScriptedRouter>>) -> Self {
        let location = LocationStore::new();
        let destination = DestinationStore::new();
        let settings = MapSettingsStore::new();
        let sink = Arc::new(RecordingSink::default());

        let inputs = EngineInputs {
            position: location.subscribe(),
            destination: destination.subscribe(),
            mode: settings.subscribe(),
        };
        let session = EngineSession::start(
            EngineConfig::default(),
            Box::new(surface.clone()),
            inputs,
            sink.clone(),
            router.map(|r| r as Arc<dyn Router>),
        )
        .unwrap();

        Self {
            location,
            destination,
            settings,
            surface,
            sink,
            session,
        }
    }

    fn set_position(&self, (lat, lon): (f64, f64)) {
        self.location.set_position(lat, lon, Some(10.0)).unwrap();
    }

    fn select_clinic(&self, (lat, lon): (f64, f64)) {
        self.destination.set_facility(Some(clinic(lat, lon)));
    }
}

fn clinic(latitude: f64, longitude: f64) -> Facility {
    Facility {
        id: 42,
        name: Some("City Clinic".to_string()),
        street: Some("Gedimino pr.".to_string()),
        house_number: Some("1".to_string()),
        city: Some("Vilnius".to_string()),
        location: Some(FacilityLocation {
            latitude: Some(latitude),
            longitude: Some(longitude),
        }),
    }
}

async fn settle() {
    tokio::time::sleep(Duration::from_secs(5)).await;
}

async fn tick() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}

// ============================================================================
// Routing scenarios
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_route_ready_with_summary() {
    let router = ScriptedRouter::fixed();
    let mut h = Harness::start(HeadlessSurface::new(), Some(router.clone()));

    h.set_position(ORIGIN);
    h.select_clinic(TARGET);
    settle().await;

    let state = h.sink.state();
    assert_eq!(state.status, RoutingStatus::Ready);
    assert_eq!(state.summary.as_deref(), Some("5.0 km, approx. 10 min drive"));
    assert!(state.error.is_none());

    let calls = router.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].origin, Coordinate::new(54.68, 25.28));
    assert_eq!(calls[0].destination, Coordinate::new(54.70, 25.30));
    assert_eq!(calls[0].profile(), "driving");

    assert_eq!(h.surface.markers().len(), 2);
    assert_eq!(h.surface.overlays().len(), 1);

    h.session.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_status_sequence_computing_then_ready() {
    let router = ScriptedRouter::fixed();
    let mut h = Harness::start(HeadlessSurface::new(), Some(router));

    h.set_position(ORIGIN);
    h.select_clinic(TARGET);
    settle().await;

    let statuses: Vec<_> = h.sink.updates().iter().filter_map(|u| u.status).collect();
    assert_eq!(statuses, vec![RoutingStatus::Computing, RoutingStatus::Ready]);

    h.session.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_stale_outcome_never_applied() {
    // Driving answers slowly, walking answers fast.
    let router = ScriptedRouter::new(|req| match req.mode {
        TravelMode::Driving => (Duration::from_secs(2), Ok(Route::new(9999.0, 60.0))),
        TravelMode::Walking => (Duration::from_millis(100), Ok(Route::new(2345.0, 400.0))),
    });
    let mut h = Harness::start(HeadlessSurface::new(), Some(router.clone()));

    h.set_position(ORIGIN);
    h.select_clinic(TARGET);
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(router.calls().len(), 1);

    h.settings.set_travel_mode("foot").unwrap();
    settle().await;

    let calls = router.calls();
    assert_eq!(calls.len(), 2);
    assert!(calls[1].generation > calls[0].generation);

    let state = h.sink.state();
    assert_eq!(state.status, RoutingStatus::Ready);
    assert_eq!(state.summary.as_deref(), Some("2.3 km, approx. 7 min walk"));

    let drove = h
        .sink
        .updates()
        .iter()
        .filter_map(|u| u.summary.clone().flatten())
        .any(|s| s.ends_with("drive"));
    assert!(!drove, "superseded driving route was applied");

    let overlays = h.surface.overlays();
    assert_eq!(overlays.len(), 1);
    assert_eq!(overlays[0].profile, "foot");

    h.session.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_rapid_changes_issue_one_request() {
    let router = ScriptedRouter::fixed();
    let mut h = Harness::start(HeadlessSurface::new(), Some(router.clone()));

    h.select_clinic(TARGET);
    for i in 0..8 {
        h.set_position((ORIGIN.0 + i as f64 * 0.0001, ORIGIN.1));
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    settle().await;

    let calls = router.calls();
    assert_eq!(calls.len(), 1);
    assert!((calls[0].origin.latitude - (ORIGIN.0 + 0.0007)).abs() < 1e-9);

    h.session.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_unchanged_inputs_do_not_reroute() {
    let router = ScriptedRouter::fixed();
    let mut h = Harness::start(HeadlessSurface::new(), Some(router.clone()));

    h.set_position(ORIGIN);
    h.select_clinic(TARGET);
    settle().await;

    // Same coordinates, new name: popup changes, route does not.
    let mut renamed = clinic(TARGET.0, TARGET.1);
    renamed.name = Some("Renamed Clinic".to_string());
    h.destination.set_facility(Some(renamed));
    h.set_position(ORIGIN);
    settle().await;

    assert_eq!(router.calls().len(), 1);
    let facility = h.surface.markers_with_icon(MarkerIcon::Facility);
    assert_eq!(facility[0].tooltip.as_deref(), Some("Renamed Clinic"));
    assert_eq!(h.sink.state().status, RoutingStatus::Ready);

    h.session.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_failure_surfaces_error_and_removes_line() {
    let router = ScriptedRouter::new(|_| {
        (
            Duration::from_millis(10),
            Err(RoutingError::NoRoute("Impossible route between points".into())),
        )
    });
    let mut h = Harness::start(HeadlessSurface::new(), Some(router.clone()));

    h.set_position(ORIGIN);
    h.select_clinic(TARGET);
    settle().await;

    let state = h.sink.state();
    assert_eq!(state.status, RoutingStatus::Error);
    assert_eq!(
        state.error.as_deref(),
        Some("Could not calculate driving route. Impossible route between points")
    );
    assert!(h.surface.overlays().is_empty());
    // Failures are not retried.
    assert_eq!(router.calls().len(), 1);

    h.session.shutdown().await.unwrap();
}

// ============================================================================
// Invalidation and ordering
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_clearing_destination_invalidates_immediately() {
    let router = ScriptedRouter::fixed();
    let mut h = Harness::start(HeadlessSurface::new(), Some(router));

    h.set_position(ORIGIN);
    h.select_clinic(TARGET);
    settle().await;
    assert_eq!(h.sink.state().status, RoutingStatus::Ready);

    h.destination.clear();
    tick().await;

    let state = h.sink.state();
    assert_eq!(state.status, RoutingStatus::Idle);
    assert!(state.summary.is_none());
    assert!(state.error.is_none());
    assert!(h.surface.overlays().is_empty());
    assert!(h.surface.markers_with_icon(MarkerIcon::Facility).is_empty());
    assert_eq!(h.surface.markers_with_icon(MarkerIcon::User).len(), 1);

    h.session.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_facility_without_coordinates_is_no_destination() {
    let router = ScriptedRouter::fixed();
    let mut h = Harness::start(HeadlessSurface::new(), Some(router.clone()));

    h.set_position(ORIGIN);
    let mut nowhere = clinic(TARGET.0, TARGET.1);
    nowhere.location = None;
    h.destination.set_facility(Some(nowhere));
    settle().await;

    assert!(router.calls().is_empty());
    assert!(h.surface.markers_with_icon(MarkerIcon::Facility).is_empty());
    assert_eq!(h.sink.state().status, RoutingStatus::Idle);

    h.session.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_update_order_does_not_matter() {
    let router_a = ScriptedRouter::fixed();
    let router_b = ScriptedRouter::fixed();
    let mut a = Harness::start(HeadlessSurface::new(), Some(router_a.clone()));
    let mut b = Harness::start(HeadlessSurface::new(), Some(router_b.clone()));

    a.set_position(ORIGIN);
    a.select_clinic(TARGET);

    b.select_clinic(TARGET);
    tokio::time::sleep(Duration::from_millis(400)).await;
    b.set_position(ORIGIN);
    settle().await;

    assert_eq!(a.sink.state(), b.sink.state());
    for icon in [MarkerIcon::User, MarkerIcon::Facility] {
        assert_eq!(
            a.surface.markers_with_icon(icon),
            b.surface.markers_with_icon(icon)
        );
    }
    assert_eq!(a.surface.overlays(), b.surface.overlays());
    assert_eq!(router_a.calls().len(), 1);
    assert_eq!(router_b.calls().len(), 1);

    a.session.shutdown().await.unwrap();
    b.session.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_first_position_pans_map() {
    let mut h = Harness::start(HeadlessSurface::new(), Some(ScriptedRouter::fixed()));
    assert_eq!(h.surface.view().map(|v| v.1), Some(12));

    h.set_position(ORIGIN);
    tick().await;
    h.set_position((ORIGIN.0 + 0.001, ORIGIN.1));
    tick().await;

    let (center, zoom) = h.surface.view().unwrap();
    assert_eq!(center, Coordinate::new(ORIGIN.0, ORIGIN.1));
    assert_eq!(zoom, 14);
    assert_eq!(h.surface.stats().pans, 1);

    let viewer = h.surface.markers_with_icon(MarkerIcon::User);
    assert_eq!(viewer[0].popup.as_deref(), Some("Your Location"));

    h.session.shutdown().await.unwrap();
}

// ============================================================================
// Readiness and configuration
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_waits_for_map_ready() {
    let router = ScriptedRouter::fixed();
    let mut h = Harness::start(HeadlessSurface::with_ready_after(3), Some(router.clone()));

    h.set_position(ORIGIN);
    h.select_clinic(TARGET);

    // Readiness was polled at 150 ms and 350 ms, both not ready.
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert!(router.calls().is_empty());

    settle().await;
    assert_eq!(router.calls().len(), 1);
    assert_eq!(h.sink.state().status, RoutingStatus::Ready);

    h.session.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_missing_endpoint_reported_once() {
    let mut h = Harness::start(HeadlessSurface::new(), None);

    h.set_position(ORIGIN);
    h.select_clinic(TARGET);
    settle().await;
    h.settings.set_travel_mode("walking").unwrap();
    settle().await;

    let state = h.sink.state();
    assert_eq!(state.status, RoutingStatus::Error);
    assert_eq!(
        state.error.as_deref(),
        Some("Routing service URL is not configured.")
    );
    assert_eq!(h.sink.updates().len(), 1);
    assert_eq!(h.surface.markers().len(), 2);
    assert!(h.surface.overlays().is_empty());

    h.session.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_surface_init_failure_aborts_start() {
    let mut surface = HeadlessSurface::new();
    surface.release();

    let location = LocationStore::new();
    let destination = DestinationStore::new();
    let settings = MapSettingsStore::new();
    let sink = Arc::new(RecordingSink::default());

    let result = EngineSession::start(
        EngineConfig::default(),
        Box::new(surface),
        EngineInputs {
            position: location.subscribe(),
            destination: destination.subscribe(),
            mode: settings.subscribe(),
        },
        sink.clone(),
        None,
    );

    assert!(matches!(result, Err(EngineError::SurfaceInit(_))));
    let updates = sink.updates();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].status, Some(RoutingStatus::Error));
}

// ============================================================================
// Teardown
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_teardown_is_idempotent_and_final() {
    let router = ScriptedRouter::fixed();
    let mut h = Harness::start(HeadlessSurface::new(), Some(router.clone()));

    h.set_position(ORIGIN);
    h.select_clinic(TARGET);
    settle().await;

    let first = h.session.shutdown().await.unwrap();
    let second = h.session.shutdown().await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first.markers_removed, 2);
    assert!(first.overlay_removed);
    assert_eq!(first.requests_issued, 1);

    assert!(h.surface.is_released());
    assert!(h.surface.markers().is_empty());
    assert!(h.surface.overlays().is_empty());
    assert_eq!(h.sink.state().status, RoutingStatus::Idle);

    // Nothing reacts after teardown.
    let published = h.sink.updates().len();
    h.settings.set_travel_mode("foot").unwrap();
    h.set_position((ORIGIN.0 + 0.01, ORIGIN.1));
    settle().await;
    assert_eq!(h.sink.updates().len(), published);
    assert_eq!(router.calls().len(), 1);
    assert!(h.session.is_finished());
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_while_request_in_flight() {
    let router = ScriptedRouter::new(|_| (Duration::from_secs(3), Ok(Route::new(1000.0, 60.0))));
    let mut h = Harness::start(HeadlessSurface::new(), Some(router));

    h.set_position(ORIGIN);
    h.select_clinic(TARGET);
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(h.sink.state().status, RoutingStatus::Computing);

    let report = h.session.shutdown().await.unwrap();
    assert!(report.overlay_removed);
    settle().await;

    assert_eq!(h.sink.state().status, RoutingStatus::Idle);
    assert!(h.surface.overlays().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_headless_surface_reinitialize_rejected_after_session() {
    let mut h = Harness::start(HeadlessSurface::new(), None);
    h.session.shutdown().await.unwrap();

    let mut surface = h.surface.clone();
    assert!(surface.initialize(&MapView::default()).is_err());
}
