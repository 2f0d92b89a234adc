//! Configuration CLI commands.
//!
//! Provides `config show` and `config path` for inspecting the effective
//! configuration.

use clap::Subcommand;
use wayfinder::config::{config_file_path, ConfigFile, SERVICE_URL_ENV};

use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Show the effective configuration (file plus environment)
    Show,

    /// Show the configuration file path
    Path,
}

/// Run a config subcommand.
pub fn run(command: ConfigCommands) -> Result<(), CliError> {
    match command {
        ConfigCommands::Show => run_show(),
        ConfigCommands::Path => {
            println!("{}", config_file_path().display());
            Ok(())
        }
    }
}

fn run_show() -> Result<(), CliError> {
    let config = ConfigFile::load()?;
    let path = config_file_path();

    println!("# {}", path.display());
    if !path.exists() {
        println!("# (file not found, showing defaults)");
    }
    println!();
    println!("[routing]");
    println!(
        "service_url = {}",
        config.routing.service_url.as_deref().unwrap_or("")
    );
    println!("timeout = {}", config.routing.timeout);
    println!();
    println!("[engine]");
    println!("debounce_ms = {}", config.engine.debounce_ms);
    println!("ready_retry_ms = {}", config.engine.ready_retry_ms);
    println!("max_ready_retries = {}", config.engine.max_ready_retries);

    if std::env::var(SERVICE_URL_ENV).is_ok() {
        println!();
        println!("# service_url overridden by {}", SERVICE_URL_ENV);
    }
    Ok(())
}
