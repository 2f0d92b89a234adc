//! Engine session: the top-level lifecycle owner.
//!
//! A session owns the rendering surface, the marker sync and the route
//! coordinator, and runs as a single Tokio task:
//!
//! ```text
//!  position ──┐
//!  destination├─► sync ─► MarkerSync ─► surface markers
//!  mode ──────┘     │
//!                   └──► RouteCoordinator ─► (debounce / retry deadline)
//!                              │                       │
//!                              ▼                       ▼
//!                       Router task ──(gen, outcome)──► on_outcome ─► sink
//! ```
//!
//! Handlers run one at a time and to completion. The routing call is the
//! only work done outside the loop; its outcome comes back over a channel
//! tagged with the request generation.

mod error;

pub use error::EngineError;

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::coord::{valid_or_none, Coordinate};
use crate::markers::{DisplayPayload, MarkerSlot, MarkerSync};
use crate::routing::{
    RouteCoordinator, RouteOutcome, RouteRequest, RouteSnapshot, Router, RoutingStateSink,
    RoutingUpdate, TravelMode,
};
use crate::sources::{Destination, PositionReading};
use crate::surface::RenderSurface;

/// Receivers for the three input sources.
pub struct EngineInputs {
    pub position: watch::Receiver<PositionReading>,
    pub destination: watch::Receiver<Option<Destination>>,
    pub mode: watch::Receiver<TravelMode>,
}

/// What teardown removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TeardownReport {
    /// Marker visuals removed from the surface.
    pub markers_removed: usize,
    /// Whether a route overlay was removed.
    pub overlay_removed: bool,
    /// Route requests issued over the session's lifetime.
    pub requests_issued: u64,
}

/// Starts engine sessions.
pub struct EngineSession;

impl EngineSession {
    /// Initializes the surface and spawns the session task.
    ///
    /// `router` is `None` when no routing service is configured; the session
    /// still syncs markers and reports the missing endpoint once.
    ///
    /// On surface initialization failure the error is published to the sink
    /// and returned; nothing is spawned.
    pub fn start(
        config: EngineConfig,
        mut surface: Box<dyn RenderSurface>,
        inputs: EngineInputs,
        sink: Arc<dyn RoutingStateSink>,
        router: Option<Arc<dyn Router>>,
    ) -> Result<SessionHandle, EngineError> {
        let runtime = Handle::try_current().map_err(|_| EngineError::NoRuntime)?;

        if let Err(e) = surface.initialize(&config.view) {
            warn!(error = %e, "Map initialization failed");
            sink.publish(RoutingUpdate::failed(e.to_string()));
            return Err(EngineError::SurfaceInit(e));
        }

        info!(
            center = %config.view.center,
            zoom = config.view.zoom,
            router = router.as_ref().map(|r| r.name()).unwrap_or("none"),
            debounce_ms = config.debounce.as_millis() as u64,
            "Engine session starting"
        );

        let cancel = CancellationToken::new();
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();

        let engine = Engine {
            coordinator: RouteCoordinator::new(config.coordinator(), sink, router.is_some()),
            markers: MarkerSync::new(),
            surface,
            router,
            user_zoom: config.user_zoom,
            outcome_tx,
            cancel: cancel.clone(),
            requests_issued: 0,
        };

        let task = runtime.spawn(engine.run(inputs, outcome_rx));

        Ok(SessionHandle {
            cancel,
            task: Some(task),
            report: None,
        })
    }
}

/// Handle to a running session.
///
/// Dropping the handle cancels the session without waiting for it.
pub struct SessionHandle {
    cancel: CancellationToken,
    task: Option<JoinHandle<TeardownReport>>,
    report: Option<TeardownReport>,
}

impl SessionHandle {
    /// Stops the session and waits for teardown.
    ///
    /// Calling this again returns the same report without doing anything.
    pub async fn shutdown(&mut self) -> Result<TeardownReport, EngineError> {
        if let Some(report) = self.report {
            return Ok(report);
        }

        self.cancel.cancel();
        let report = match self.task.take() {
            Some(task) => task.await.map_err(|e| EngineError::Task(e.to_string()))?,
            None => TeardownReport::default(),
        };
        self.report = Some(report);
        Ok(report)
    }

    /// Token that stops the session when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Returns true once the session task has exited.
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, |t| t.is_finished())
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

struct Engine {
    surface: Box<dyn RenderSurface>,
    markers: MarkerSync,
    coordinator: RouteCoordinator,
    router: Option<Arc<dyn Router>>,
    user_zoom: u8,
    outcome_tx: mpsc::UnboundedSender<(u64, RouteOutcome)>,
    cancel: CancellationToken,
    requests_issued: u64,
}

impl Engine {
    async fn run(
        mut self,
        mut inputs: EngineInputs,
        mut outcome_rx: mpsc::UnboundedReceiver<(u64, RouteOutcome)>,
    ) -> TeardownReport {
        self.sync(&mut inputs);

        let mut position_open = true;
        let mut destination_open = true;
        let mut mode_open = true;

        loop {
            let deadline = self.coordinator.next_deadline();

            tokio::select! {
                biased;

                _ = self.cancel.cancelled() => break,

                Some((generation, outcome)) = outcome_rx.recv() => {
                    self.coordinator.on_outcome(generation, outcome, self.surface.as_mut());
                }

                changed = inputs.position.changed(), if position_open => {
                    position_open = changed.is_ok();
                    self.sync(&mut inputs);
                }

                changed = inputs.destination.changed(), if destination_open => {
                    destination_open = changed.is_ok();
                    self.sync(&mut inputs);
                }

                changed = inputs.mode.changed(), if mode_open => {
                    mode_open = changed.is_ok();
                    self.sync(&mut inputs);
                }

                _ = wait_until(deadline) => {
                    if let Some(request) = self.coordinator.on_timer(Instant::now(), self.surface.as_mut()) {
                        self.dispatch(request);
                    }
                }
            }
        }

        // Receivers are dropped here, before teardown, so no source change
        // is observed afterwards.
        drop(inputs);
        self.teardown()
    }

    /// Reads all three sources and brings markers and route in line with them.
    fn sync(&mut self, inputs: &mut EngineInputs) {
        let position = inputs
            .position
            .borrow_and_update()
            .coordinate
            .and_then(Coordinate::validated);
        let destination = inputs.destination.borrow_and_update().clone();
        let mode = *inputs.mode.borrow_and_update();

        let target = destination
            .as_ref()
            .and_then(|d| valid_or_none(d.coordinate));

        let surface = self.surface.as_mut();

        if self
            .markers
            .upsert(surface, MarkerSlot::Viewer, position, &DisplayPayload::viewer())
        {
            if let Some(at) = position {
                surface.pan_to(at, self.user_zoom);
            }
        }

        let payload = match target {
            Some(_) => DisplayPayload::destination(destination.as_ref()),
            None => DisplayPayload::default(),
        };
        self.markers
            .upsert(surface, MarkerSlot::Destination, target, &payload);

        let snapshot = match (position, target) {
            (Some(origin), Some(destination)) => Some(RouteSnapshot {
                origin,
                destination,
                mode,
            }),
            _ => None,
        };
        self.coordinator.on_input(snapshot, Instant::now(), surface);
    }

    /// Runs the routing call on its own task and posts the outcome back.
    fn dispatch(&mut self, request: RouteRequest) {
        let Some(router) = self.router.clone() else {
            return;
        };
        self.requests_issued += 1;

        let tx = self.outcome_tx.clone();
        let cancel = self.cancel.child_token();
        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!(generation = request.generation, "Route request abandoned at shutdown");
                }
                result = router.route(&request) => {
                    let _ = tx.send((request.generation, RouteOutcome::from(result)));
                }
            }
        });
    }

    fn teardown(&mut self) -> TeardownReport {
        let surface = self.surface.as_mut();
        let overlay_removed = self.coordinator.shutdown(surface);
        let markers_removed = self.markers.clear(surface);
        surface.release();

        let report = TeardownReport {
            markers_removed,
            overlay_removed,
            requests_issued: self.requests_issued,
        };
        info!(
            markers_removed = report.markers_removed,
            overlay_removed = report.overlay_removed,
            requests_issued = report.requests_issued,
            "Engine session stopped"
        );
        report
    }
}

/// Sleeps until the deadline, or forever when there is none.
async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
