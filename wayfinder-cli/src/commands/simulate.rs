//! Simulate command - run an engine session against the headless surface.
//!
//! Walks the viewer's position from `--from` toward `--to` in steps, with
//! the destination fixed at `--to`, then waits for the route to settle and
//! prints what ended up on the map.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use wayfinder::coord::Coordinate;
use wayfinder::routing::{RoutingState, RoutingStatus, SharedRoutingState};
use wayfinder::session::{EngineInputs, EngineSession, TeardownReport};
use wayfinder::sources::{
    DestinationStore, Facility, FacilityLocation, LocationStore, MapSettingsStore,
};
use wayfinder::surface::{HeadlessSurface, MarkerIcon};

use super::common::{build_router, ModeArg};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the simulate command.
pub struct SimulateArgs {
    pub from: Coordinate,
    pub to: Coordinate,
    pub mode: ModeArg,
    pub name: Option<String>,
    pub steps: u32,
    pub interval: Duration,
    pub service_url: Option<String>,
}

/// Run the simulate command.
pub fn run(runner: &CliRunner, args: SimulateArgs) -> Result<(), CliError> {
    runner.log_startup("simulate");

    let routing = runner.routing_config(args.service_url.clone());
    let router = build_router(&routing)?;
    if router.is_none() {
        warn!("No routing service configured; markers only");
    }

    let cancel = CancellationToken::new();
    let handler_token = cancel.clone();
    ctrlc::set_handler(move || handler_token.cancel())
        .map_err(|e| CliError::Runtime(format!("Failed to set Ctrl-C handler: {}", e)))?;

    let engine_config = runner.config().engine_config();
    let quiet = engine_config.debounce + engine_config.ready_retry_delay;
    let settle_timeout = routing.timeout + quiet * 2 + Duration::from_secs(1);

    let runtime = runner.runtime()?;
    let (state, report, surface) = runtime.block_on(async move {
        let location = LocationStore::new();
        let destination = DestinationStore::new();
        let settings = MapSettingsStore::with_mode(args.mode.into());
        let state = Arc::new(SharedRoutingState::new());
        let surface = HeadlessSurface::new();

        let mut session = EngineSession::start(
            engine_config,
            Box::new(surface.clone()),
            EngineInputs {
                position: location.subscribe(),
                destination: destination.subscribe(),
                mode: settings.subscribe(),
            },
            state.clone(),
            router,
        )?;

        destination.set_facility(Some(Facility {
            id: 1,
            name: args.name.clone(),
            location: Some(FacilityLocation {
                latitude: Some(args.to.latitude),
                longitude: Some(args.to.longitude),
            }),
            ..Default::default()
        }));

        let steps = args.steps.max(1);
        for step in 0..steps {
            if cancel.is_cancelled() {
                break;
            }
            let at = interpolate(args.from, args.to, step, steps);
            if let Err(e) = location.set_position(at.latitude, at.longitude, None) {
                warn!(error = %e, "Skipping invalid position");
            }
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(args.interval) => {}
            }
        }

        let settled = tokio::select! {
            _ = cancel.cancelled() => None,
            settled = wait_for_settled(state.subscribe(), quiet, settle_timeout) => Some(settled),
        };
        if settled.is_none() {
            info!("Interrupted");
        }

        let final_state = state.snapshot();
        let report = session.shutdown().await?;
        Ok::<_, CliError>((final_state, report, surface))
    })?;

    print_summary(&state, &report, &surface);
    Ok(())
}

/// Point `step` of `steps` on the straight line from `from` toward `to`.
///
/// The last step stops short of `to`, so origin and destination never meet.
fn interpolate(from: Coordinate, to: Coordinate, step: u32, steps: u32) -> Coordinate {
    let t = step as f64 / (steps as f64 + 1.0);
    Coordinate::new(
        from.latitude + (to.latitude - from.latitude) * t,
        from.longitude + (to.longitude - from.longitude) * t,
    )
}

/// Waits for the routing status to settle after the last input change.
///
/// `quiet` must cover the debounce window plus one readiness retry, so a
/// result from before the last change is not taken as final. After that the
/// status has to leave `Idle` and not be computing. Returns false on timeout.
async fn wait_for_settled(
    mut rx: watch::Receiver<RoutingState>,
    quiet: Duration,
    timeout: Duration,
) -> bool {
    let settled = tokio::time::timeout(timeout, async {
        tokio::time::sleep(quiet).await;
        loop {
            let done = {
                let state = rx.borrow_and_update();
                state.status != RoutingStatus::Idle && !state.is_routing()
            };
            if done || rx.changed().await.is_err() {
                return;
            }
        }
    })
    .await;
    settled.is_ok()
}

fn print_summary(state: &RoutingState, report: &TeardownReport, surface: &HeadlessSurface) {
    println!("Routing status: {}", state.status);
    match state.status {
        RoutingStatus::Ready => {
            if let Some(summary) = &state.summary {
                println!("  {}", summary);
            }
        }
        RoutingStatus::Error => {
            if let Some(error) = &state.error {
                println!("  {}", error);
            }
        }
        _ => {}
    }

    let stats = surface.stats();
    println!();
    println!("Surface activity:");
    println!(
        "  Markers: {} created, {} moved, {} removed",
        stats.markers_created, stats.markers_moved, stats.markers_removed
    );
    println!(
        "  Route overlays: {} added, {} drawn, {} removed",
        stats.overlays_added, stats.routes_drawn, stats.overlays_removed
    );
    println!("  View fitted to route: {} times", stats.fits);
    println!("  Route requests: {}", report.requests_issued);
    println!(
        "  Viewer marker visible at exit: {}",
        !surface.markers_with_icon(MarkerIcon::User).is_empty()
    );
}
