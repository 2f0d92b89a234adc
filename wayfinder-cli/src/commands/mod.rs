//! CLI command implementations.
//!
//! # Command Modules
//!
//! - [`config`] - Configuration inspection (show, path)
//! - [`route`] - One-shot route query
//! - [`simulate`] - Engine session against the headless surface

pub mod common;
pub mod config;
pub mod route;
pub mod simulate;
