//! Route command - one-shot route query against the routing service.

use wayfinder::coord::{distance_meters, Coordinate};
use wayfinder::routing::{failure_message, format_route, RouteRequest, RoutingError, TravelMode};

use super::common::{build_router, ModeArg};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the route command.
pub struct RouteArgs {
    pub from: Coordinate,
    pub to: Coordinate,
    pub mode: ModeArg,
    pub service_url: Option<String>,
}

/// Run the route command.
pub fn run(runner: &CliRunner, args: RouteArgs) -> Result<(), CliError> {
    runner.log_startup("route");

    let routing = runner.routing_config(args.service_url);
    let router = build_router(&routing)?.ok_or(RoutingError::NotConfigured)?;
    let mode = TravelMode::from(args.mode);

    let request = RouteRequest {
        origin: args.from,
        destination: args.to,
        mode,
        generation: 1,
    };

    println!("Routing {} -> {} ({})", args.from, args.to, mode.profile());
    println!(
        "  Straight line: {:.1} km",
        distance_meters(&args.from, &args.to) / 1000.0
    );

    let runtime = runner.runtime()?;
    let result = runtime.block_on(router.route(&request));

    match result {
        Ok(route) => {
            println!("  {}", format_route(&route, mode));
            println!("  Geometry: {} points", route.geometry.len());
            Ok(())
        }
        Err(e) => {
            eprintln!("{}", failure_message(mode, &e.to_string()));
            Err(CliError::Routing(e))
        }
    }
}
