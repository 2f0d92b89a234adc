//! Route coordination: debounce, generations, readiness retry and result
//! reconciliation.
//!
//! # State Machine
//!
//! ```text
//! Idle      --[valid snapshot, debounce elapsed, map ready]--> Computing
//! Computing --[newer snapshot issued]----------------------> Computing (old generation stale)
//! Computing --[outcome, current generation]----------------> Ready | Error
//! Computing --[outcome, older generation]------------------> Computing (discarded)
//! *         --[origin or destination invalid]--------------> Idle
//! ```
//!
//! The coordinator is a plain value driven by the engine session: inputs,
//! timer expiry and settled outcomes are fed in, and the session performs the
//! routing call for each [`RouteRequest`] handed back. Timers are deadlines
//! stored on the coordinator; the session sleeps until
//! [`RouteCoordinator::next_deadline`].
//!
//! A generation number is allocated per issued request and is the only thing
//! that decides whether an outcome is applied. Superseded calls still
//! complete and are then ignored.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::{DEFAULT_DEBOUNCE, DEFAULT_MAX_READY_RETRIES, DEFAULT_READY_RETRY_DELAY};
use crate::coord::distance_meters;
use crate::surface::{OverlayHandle, RenderSurface, RouteStyle};

use super::state::{RoutingStateSink, RoutingUpdate};
use super::summary::{failure_message, format_route};
use super::types::{RouteOutcome, RouteRequest, RouteSnapshot, RoutingError, RoutingStatus, TravelMode};

/// Error reported when the map never became ready for a route overlay.
pub const MAP_NOT_READY_MESSAGE: &str = "Map is not ready; route could not be computed.";

/// Timing settings for the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinatorConfig {
    /// Quiescence window before a changed snapshot is routed.
    pub debounce: Duration,
    /// Delay between readiness checks while the map is not ready.
    pub ready_retry_delay: Duration,
    /// Readiness checks to retry before giving up.
    pub max_ready_retries: u32,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            ready_retry_delay: DEFAULT_READY_RETRY_DELAY,
            max_ready_retries: DEFAULT_MAX_READY_RETRIES,
        }
    }
}

/// Request currently awaiting its outcome.
#[derive(Debug, Clone, Copy)]
struct InFlight {
    generation: u64,
    mode: TravelMode,
}

/// Owns the route overlay and the routing status.
pub struct RouteCoordinator {
    config: CoordinatorConfig,
    sink: Arc<dyn RoutingStateSink>,
    routing_available: bool,
    config_error_reported: bool,
    status: RoutingStatus,
    generation: u64,
    in_flight: Option<InFlight>,
    /// Latest valid snapshot, waiting for the debounce or retry timer.
    latest: Option<RouteSnapshot>,
    /// Snapshot of the most recently issued request.
    last_issued: Option<RouteSnapshot>,
    overlay: Option<OverlayHandle>,
    debounce_deadline: Option<Instant>,
    retry_deadline: Option<Instant>,
    ready_retries: u32,
    shut_down: bool,
}

impl std::fmt::Debug for RouteCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteCoordinator")
            .field("status", &self.status)
            .field("generation", &self.generation)
            .field("routing_available", &self.routing_available)
            .field("overlay", &self.overlay)
            .finish()
    }
}

impl RouteCoordinator {
    /// Creates a coordinator.
    ///
    /// `routing_available` is false when no routing service is configured;
    /// the coordinator then reports that once and never issues requests.
    pub fn new(
        config: CoordinatorConfig,
        sink: Arc<dyn RoutingStateSink>,
        routing_available: bool,
    ) -> Self {
        Self {
            config,
            sink,
            routing_available,
            config_error_reported: false,
            status: RoutingStatus::Idle,
            generation: 0,
            in_flight: None,
            latest: None,
            last_issued: None,
            overlay: None,
            debounce_deadline: None,
            retry_deadline: None,
            ready_retries: 0,
            shut_down: false,
        }
    }

    /// Current routing status.
    pub fn status(&self) -> RoutingStatus {
        self.status
    }

    /// Generation of the most recently issued request (0 before any).
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Overlay of the current attempt, if any.
    pub fn overlay(&self) -> Option<OverlayHandle> {
        self.overlay
    }

    /// Returns true while a request awaits its outcome.
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Earliest pending timer deadline.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.debounce_deadline, self.retry_deadline) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Feeds the derived snapshot after any input change.
    ///
    /// `None` means origin or destination is missing or invalid; that
    /// invalidation is applied immediately. A valid snapshot (re)starts the
    /// debounce window.
    pub fn on_input(
        &mut self,
        snapshot: Option<RouteSnapshot>,
        now: Instant,
        surface: &mut dyn RenderSurface,
    ) {
        if self.shut_down {
            return;
        }

        if !self.routing_available {
            if snapshot.is_some() && !self.config_error_reported {
                self.config_error_reported = true;
                self.set_status(RoutingStatus::Error);
                warn!("Routing requested but no routing service is configured");
                self.sink
                    .publish(RoutingUpdate::failed(RoutingError::NotConfigured.to_string()));
            }
            return;
        }

        let Some(snapshot) = snapshot else {
            self.invalidate(surface);
            return;
        };

        let pending = self.debounce_deadline.is_some() || self.retry_deadline.is_some();
        if pending && self.latest == Some(snapshot) {
            return;
        }

        self.latest = Some(snapshot);
        self.retry_deadline = None;
        self.ready_retries = 0;

        if self.debounce_deadline.is_none() && self.last_issued == Some(snapshot) {
            debug!("Route inputs unchanged; no request needed");
            return;
        }

        self.debounce_deadline = Some(now + self.config.debounce);
    }

    /// Handles timer expiry. Returns the request to dispatch, if one was issued.
    pub fn on_timer(
        &mut self,
        now: Instant,
        surface: &mut dyn RenderSurface,
    ) -> Option<RouteRequest> {
        if self.shut_down {
            return None;
        }

        let mut due = false;
        if self.debounce_deadline.is_some_and(|d| d <= now) {
            self.debounce_deadline = None;
            due = true;
        }
        if self.retry_deadline.is_some_and(|d| d <= now) {
            self.retry_deadline = None;
            due = true;
        }

        if due {
            self.attempt(now, surface)
        } else {
            None
        }
    }

    fn attempt(&mut self, now: Instant, surface: &mut dyn RenderSurface) -> Option<RouteRequest> {
        let snapshot = self.latest?;

        if self.last_issued == Some(snapshot) {
            debug!(generation = self.generation, "Suppressing duplicate route request");
            return None;
        }

        if !surface.is_ready() {
            if self.ready_retries >= self.config.max_ready_retries {
                warn!(
                    retries = self.ready_retries,
                    "Map did not become ready; giving up on route"
                );
                self.ready_retries = 0;
                self.generation += 1;
                self.in_flight = None;
                self.last_issued = Some(snapshot);
                self.remove_overlay(surface);
                self.set_status(RoutingStatus::Error);
                self.sink.publish(RoutingUpdate::failed(MAP_NOT_READY_MESSAGE));
                return None;
            }
            self.ready_retries += 1;
            self.retry_deadline = Some(now + self.config.ready_retry_delay);
            debug!(
                attempt = self.ready_retries,
                delay_ms = self.config.ready_retry_delay.as_millis() as u64,
                "Map not ready, deferring route request"
            );
            return None;
        }

        self.ready_retries = 0;
        self.generation += 1;
        let request = RouteRequest::from_snapshot(snapshot, self.generation);

        self.remove_overlay(surface);
        self.overlay = Some(surface.add_route_overlay(
            request.origin,
            request.destination,
            request.profile(),
        ));
        self.in_flight = Some(InFlight {
            generation: request.generation,
            mode: request.mode,
        });
        self.last_issued = Some(snapshot);

        info!(
            generation = request.generation,
            profile = request.profile(),
            from = %request.origin,
            to = %request.destination,
            straight_line_m = distance_meters(&request.origin, &request.destination).round(),
            "Route request issued"
        );

        self.set_status(RoutingStatus::Computing);
        self.sink.publish(RoutingUpdate::computing());
        Some(request)
    }

    /// Applies a settled outcome. Returns false if the outcome was stale.
    pub fn on_outcome(
        &mut self,
        generation: u64,
        outcome: RouteOutcome,
        surface: &mut dyn RenderSurface,
    ) -> bool {
        let current = match self.in_flight {
            Some(in_flight) if in_flight.generation == generation && !self.shut_down => in_flight,
            _ => {
                debug!(
                    generation,
                    latest = self.generation,
                    "Discarding stale route outcome"
                );
                return false;
            }
        };
        self.in_flight = None;

        match outcome {
            RouteOutcome::Success(route) => {
                if let Some(overlay) = self.overlay {
                    surface.draw_route(overlay, &route.geometry, RouteStyle::default());
                }
                if !route.geometry.is_empty() {
                    surface.fit_bounds(&route.geometry);
                }
                let summary = format_route(&route, current.mode);
                info!(generation, %summary, "Route ready");
                self.set_status(RoutingStatus::Ready);
                self.sink.publish(RoutingUpdate::ready(summary));
            }
            RouteOutcome::Failure { message } => {
                warn!(generation, error = %message, "Route calculation failed");
                self.remove_overlay(surface);
                self.set_status(RoutingStatus::Error);
                self.sink
                    .publish(RoutingUpdate::failed(failure_message(current.mode, &message)));
            }
        }
        true
    }

    /// Clears the route: overlay removed, timers dropped, status Idle.
    fn invalidate(&mut self, surface: &mut dyn RenderSurface) {
        self.latest = None;
        self.last_issued = None;
        self.in_flight = None;
        self.debounce_deadline = None;
        self.retry_deadline = None;
        self.ready_retries = 0;
        self.remove_overlay(surface);

        if self.status != RoutingStatus::Idle {
            debug!("Route inputs invalidated");
            self.set_status(RoutingStatus::Idle);
            self.sink.publish(RoutingUpdate::idle());
        }
    }

    /// Tears the coordinator down. Publishes `Idle` once; later calls are no-ops.
    ///
    /// Returns true if a route overlay was removed.
    pub fn shutdown(&mut self, surface: &mut dyn RenderSurface) -> bool {
        if self.shut_down {
            return false;
        }
        self.shut_down = true;

        let had_overlay = self.overlay.is_some();
        self.latest = None;
        self.in_flight = None;
        self.debounce_deadline = None;
        self.retry_deadline = None;
        self.remove_overlay(surface);
        self.status = RoutingStatus::Idle;
        self.sink.publish(RoutingUpdate::idle());
        had_overlay
    }

    fn remove_overlay(&mut self, surface: &mut dyn RenderSurface) {
        if let Some(overlay) = self.overlay.take() {
            if let Err(e) = surface.remove_route_overlay(overlay) {
                warn!(%overlay, error = %e, "Failed to remove route overlay");
            }
        }
    }

    fn set_status(&mut self, status: RoutingStatus) {
        if self.status != status {
            debug!(from = %self.status, to = %status, "Routing status transition");
            self.status = status;
        }
    }
}
