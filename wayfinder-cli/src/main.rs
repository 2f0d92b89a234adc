//! Wayfinder CLI - Command-line interface
//!
//! Query the routing service directly, or run an engine session against a
//! headless map and watch how markers and the route converge.

mod commands;
mod error;
mod runner;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use wayfinder::coord::Coordinate;

use commands::common::ModeArg;
use commands::config::ConfigCommands;
use commands::route::RouteArgs;
use commands::simulate::SimulateArgs;
use error::CliError;
use runner::CliRunner;

#[derive(Parser)]
#[command(name = "wayfinder")]
#[command(version, about = "Map marker and route synchronization engine", long_about = None)]
struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Also write logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute a single route and print its summary
    Route {
        /// Origin as LAT,LON
        #[arg(long, allow_hyphen_values = true)]
        from: Coordinate,

        /// Destination as LAT,LON
        #[arg(long, allow_hyphen_values = true)]
        to: Coordinate,

        /// Travel mode
        #[arg(long, value_enum, default_value = "driving")]
        mode: ModeArg,

        /// OSRM service base URL (overrides config and OSRM_SERVICE_URL)
        #[arg(long)]
        service_url: Option<String>,
    },

    /// Run an engine session with a moving viewer and print the outcome
    Simulate {
        /// Starting viewer position as LAT,LON
        #[arg(long, allow_hyphen_values = true)]
        from: Coordinate,

        /// Destination as LAT,LON
        #[arg(long, allow_hyphen_values = true)]
        to: Coordinate,

        /// Travel mode
        #[arg(long, value_enum, default_value = "driving")]
        mode: ModeArg,

        /// Destination name shown in the marker popup
        #[arg(long)]
        name: Option<String>,

        /// Number of position updates
        #[arg(long, default_value = "5")]
        steps: u32,

        /// Milliseconds between position updates
        #[arg(long, default_value = "100")]
        interval_ms: u64,

        /// OSRM service base URL (overrides config and OSRM_SERVICE_URL)
        #[arg(long)]
        service_url: Option<String>,
    },

    /// Inspect configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        e.exit();
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Config(command) => commands::config::run(command),
        Commands::Route {
            from,
            to,
            mode,
            service_url,
        } => {
            let runner = CliRunner::new(cli.verbose, cli.log_file)?;
            commands::route::run(
                &runner,
                RouteArgs {
                    from,
                    to,
                    mode,
                    service_url,
                },
            )
        }
        Commands::Simulate {
            from,
            to,
            mode,
            name,
            steps,
            interval_ms,
            service_url,
        } => {
            let runner = CliRunner::new(cli.verbose, cli.log_file)?;
            commands::simulate::run(
                &runner,
                SimulateArgs {
                    from,
                    to,
                    mode,
                    name,
                    steps,
                    interval: Duration::from_millis(interval_ms),
                    service_url,
                },
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_route() {
        let cli = Cli::try_parse_from([
            "wayfinder",
            "route",
            "--from",
            "54.68,25.28",
            "--to",
            "54.70,25.30",
            "--mode",
            "foot",
        ])
        .unwrap();

        match cli.command {
            Commands::Route { from, to, mode, .. } => {
                assert_eq!(from, Coordinate::new(54.68, 25.28));
                assert_eq!(to, Coordinate::new(54.70, 25.30));
                assert_eq!(mode, ModeArg::Walking);
            }
            _ => panic!("expected route command"),
        }
    }

    #[test]
    fn test_parse_negative_coordinates() {
        let cli = Cli::try_parse_from([
            "wayfinder",
            "route",
            "--from",
            "-33.92,18.42",
            "--to",
            "-33.90,18.40",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::Route { .. }));
    }

    #[test]
    fn test_rejects_out_of_range_coordinate() {
        let result = Cli::try_parse_from([
            "wayfinder",
            "route",
            "--from",
            "95.0,25.28",
            "--to",
            "54.70,25.30",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_simulate_defaults() {
        let cli = Cli::try_parse_from([
            "wayfinder",
            "simulate",
            "--from",
            "54.68,25.28",
            "--to",
            "54.70,25.30",
        ])
        .unwrap();

        match cli.command {
            Commands::Simulate {
                steps, interval_ms, mode, ..
            } => {
                assert_eq!(steps, 5);
                assert_eq!(interval_ms, 100);
                assert_eq!(mode, ModeArg::Driving);
            }
            _ => panic!("expected simulate command"),
        }
    }
}
